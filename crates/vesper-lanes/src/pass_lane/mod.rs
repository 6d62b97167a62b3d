// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Pass lane - deferred recording and replay of draw passes

pub mod command;
mod draw_buf;
mod pass;
mod sortable;
mod state;
mod stream;
mod trace;

pub use command::{Bound, Command, CommandType, ConstantSource, Header, PushConstant};
pub use draw_buf::*;
pub use pass::*;
pub use sortable::*;
pub use state::*;
pub use stream::*;
pub use trace::*;
