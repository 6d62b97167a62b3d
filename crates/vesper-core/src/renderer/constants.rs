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

//! Push constant payloads.
//!
//! [`PushConstantValue`] is what callers record. [`PushConstantData`] is what an
//! executor receives at replay: a borrowed view over the packed 32-bit words.
//! A [`ConstantCell`] holds values, or arrays of values, that are read at
//! submission time instead of record time.

use bytemuck::cast_slice;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// A value uploaded to a shader uniform location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PushConstantValue {
    /// `float`
    Float(f32),
    /// `vec2`
    Vec2([f32; 2]),
    /// `vec3`
    Vec3([f32; 3]),
    /// `vec4`
    Vec4([f32; 4]),
    /// `int`
    Int(i32),
    /// `ivec2`
    IVec2([i32; 2]),
    /// `ivec3`
    IVec3([i32; 3]),
    /// `ivec4`
    IVec4([i32; 4]),
    /// `bool`, uploaded as an `int`.
    Bool(bool),
    /// `mat4`, column-major.
    Mat4([[f32; 4]; 4]),
}

/// Scalar type of a push constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstantKind {
    /// 32-bit floats.
    Float,
    /// 32-bit signed integers.
    Int,
}

impl PushConstantValue {
    /// Scalar type of the value.
    pub fn kind(&self) -> ConstantKind {
        match self {
            PushConstantValue::Float(_)
            | PushConstantValue::Vec2(_)
            | PushConstantValue::Vec3(_)
            | PushConstantValue::Vec4(_)
            | PushConstantValue::Mat4(_) => ConstantKind::Float,
            _ => ConstantKind::Int,
        }
    }

    /// Number of scalar components.
    pub fn component_len(&self) -> usize {
        match self {
            PushConstantValue::Float(_)
            | PushConstantValue::Int(_)
            | PushConstantValue::Bool(_) => 1,
            PushConstantValue::Vec2(_) | PushConstantValue::IVec2(_) => 2,
            PushConstantValue::Vec3(_) | PushConstantValue::IVec3(_) => 3,
            PushConstantValue::Vec4(_) | PushConstantValue::IVec4(_) => 4,
            PushConstantValue::Mat4(_) => 16,
        }
    }

    /// Packs the value into 32-bit words, zero padded to 16 words.
    pub fn to_words(&self) -> [u32; 16] {
        let mut words = [0u32; 16];
        let src: &[u32] = match self {
            PushConstantValue::Float(v) => cast_slice(std::slice::from_ref(v)),
            PushConstantValue::Vec2(v) => cast_slice(v),
            PushConstantValue::Vec3(v) => cast_slice(v),
            PushConstantValue::Vec4(v) => cast_slice(v),
            PushConstantValue::Int(v) => cast_slice(std::slice::from_ref(v)),
            PushConstantValue::IVec2(v) => cast_slice(v),
            PushConstantValue::IVec3(v) => cast_slice(v),
            PushConstantValue::IVec4(v) => cast_slice(v),
            PushConstantValue::Bool(v) => {
                words[0] = u32::from(*v);
                return words;
            }
            PushConstantValue::Mat4(m) => cast_slice(m.as_slice()),
        };
        words[..src.len()].copy_from_slice(src);
        words
    }
}

macro_rules! push_constant_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for PushConstantValue {
                fn from(value: $ty) -> Self {
                    PushConstantValue::$variant(value)
                }
            }
        )*
    };
}

push_constant_from!(
    f32 => Float,
    [f32; 2] => Vec2,
    [f32; 3] => Vec3,
    [f32; 4] => Vec4,
    i32 => Int,
    [i32; 2] => IVec2,
    [i32; 3] => IVec3,
    [i32; 4] => IVec4,
    bool => Bool,
    [[f32; 4]; 4] => Mat4,
);

/// Push constant data handed to an executor at replay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PushConstantData<'a> {
    /// Float data, `values.len()` is the component count.
    Float(&'a [f32]),
    /// Integer data, `values.len()` is the component count.
    Int(&'a [i32]),
}

impl<'a> PushConstantData<'a> {
    /// Reinterprets packed words according to `kind`.
    pub fn from_words(kind: ConstantKind, words: &'a [u32]) -> Self {
        match kind {
            ConstantKind::Float => PushConstantData::Float(cast_slice(words)),
            ConstantKind::Int => PushConstantData::Int(cast_slice(words)),
        }
    }

    /// Number of scalar components.
    pub fn len(&self) -> usize {
        match self {
            PushConstantData::Float(v) => v.len(),
            PushConstantData::Int(v) => v.len(),
        }
    }

    /// Returns `true` when no component is present.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shared uniform storage read when the push constant is replayed.
///
/// Holds `array_len` values of a single shape. Cloning shares the storage, so
/// updates made after recording are seen by every later submission.
#[derive(Clone)]
pub struct ConstantCell {
    kind: ConstantKind,
    comp_len: u8,
    array_len: usize,
    words: Arc<[AtomicU32]>,
}

impl ConstantCell {
    /// Creates a cell holding a single value.
    pub fn new(value: impl Into<PushConstantValue>) -> Self {
        Self::array(&[value.into()])
    }

    /// Creates a cell holding a uniform array.
    ///
    /// # Panics
    ///
    /// When `values` is empty or mixes value shapes.
    pub fn array(values: &[PushConstantValue]) -> Self {
        assert!(!values.is_empty(), "push constant array must not be empty");
        let first = values[0];
        let words = (0..first.component_len() * values.len())
            .map(|_| AtomicU32::new(0))
            .collect();
        let cell = Self {
            kind: first.kind(),
            comp_len: first.component_len() as u8,
            array_len: values.len(),
            words,
        };
        for (index, value) in values.iter().enumerate() {
            cell.set_element(index, *value);
        }
        cell
    }

    /// Scalar type of the stored values.
    pub fn kind(&self) -> ConstantKind {
        self.kind
    }

    /// Components per element.
    pub fn component_len(&self) -> usize {
        usize::from(self.comp_len)
    }

    /// Number of elements.
    pub fn array_len(&self) -> usize {
        self.array_len
    }

    /// Updates the first element.
    pub fn set(&self, value: impl Into<PushConstantValue>) {
        self.set_element(0, value);
    }

    /// Updates element `index`.
    ///
    /// # Panics
    ///
    /// When `index` is out of range or `value` does not have the cell's shape.
    pub fn set_element(&self, index: usize, value: impl Into<PushConstantValue>) {
        let value = value.into();
        assert!(
            index < self.array_len,
            "element {index} out of a push constant array of {}",
            self.array_len
        );
        assert!(
            value.kind() == self.kind && value.component_len() == self.component_len(),
            "push constant cell holds {:?} values of {} components",
            self.kind,
            self.comp_len
        );
        let comp_len = self.component_len();
        let slots = &self.words[index * comp_len..(index + 1) * comp_len];
        for (slot, word) in slots.iter().zip(value.to_words()) {
            slot.store(word, Ordering::Release);
        }
    }

    /// Copies out every element, packed one after the other.
    pub fn read(&self) -> Vec<u32> {
        self.words
            .iter()
            .map(|word| word.load(Ordering::Acquire))
            .collect()
    }
}

impl fmt::Debug for ConstantCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstantCell")
            .field("kind", &self.kind)
            .field("comp_len", &self.comp_len)
            .field("array_len", &self.array_len)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn vec3_packs_three_words() {
        let value = PushConstantValue::from([1.0f32, 2.5, -3.0]);
        let words = value.to_words();

        assert_eq!(value.kind(), ConstantKind::Float);
        assert_eq!(value.component_len(), 3);

        let data = PushConstantData::from_words(value.kind(), &words[..value.component_len()]);
        match data {
            PushConstantData::Float(v) => {
                assert_relative_eq!(v[0], 1.0);
                assert_relative_eq!(v[1], 2.5);
                assert_relative_eq!(v[2], -3.0);
            }
            PushConstantData::Int(_) => panic!("expected float data"),
        }
    }

    #[test]
    fn matrix_packs_column_major() {
        let mut m = [[0.0f32; 4]; 4];
        for (c, column) in m.iter_mut().enumerate() {
            for (r, value) in column.iter_mut().enumerate() {
                *value = (c * 4 + r) as f32;
            }
        }
        let words = PushConstantValue::Mat4(m).to_words();
        let floats: &[f32] = cast_slice(&words);
        for (i, value) in floats.iter().enumerate() {
            assert_relative_eq!(*value, i as f32);
        }
    }

    #[test]
    fn bool_is_uploaded_as_int() {
        let value = PushConstantValue::from(true);
        assert_eq!(value.kind(), ConstantKind::Int);
        assert_eq!(value.to_words()[0], 1);
        assert_eq!(
            PushConstantData::from_words(ConstantKind::Int, &[7]),
            PushConstantData::Int(&[7])
        );
    }

    #[test]
    fn cell_array_updates_one_element() {
        let cell = ConstantCell::array(&[
            PushConstantValue::Vec2([1.0, 2.0]),
            PushConstantValue::Vec2([3.0, 4.0]),
        ]);
        let shared = cell.clone();
        assert_eq!(
            (cell.kind(), cell.component_len(), cell.array_len()),
            (ConstantKind::Float, 2, 2)
        );

        shared.set_element(1, [5.0f32, 6.0]);
        let words = cell.read();
        let floats: &[f32] = cast_slice(&words);
        assert_eq!(floats.to_vec(), vec![1.0f32, 2.0, 5.0, 6.0]);
    }

    #[test]
    #[should_panic(expected = "push constant cell holds")]
    fn cell_rejects_other_shapes() {
        let cell = ConstantCell::new(1i32);
        cell.set(1.0f32);
    }
}
