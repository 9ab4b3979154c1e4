//! Bone table and per-vertex bone bindings

use std::collections::HashMap;

use glam::Mat4;

/// Maximum number of bones influencing a single vertex
pub const MAX_NUM_BONES_PER_VERTEX: usize = 4;

/// A bone: its name and inverse bind-pose ("offset") matrix
#[derive(Debug, Clone, PartialEq)]
pub struct BoneInfo {
    pub name: String,
    /// Transforms from mesh space into the bone's local space
    pub offset: Mat4,
}

/// Bone name to dense, zero-based bone index
///
/// Indices are assigned in first-seen order and never change; they are
/// the positions in the bone matrix palette uploaded to the GPU.
#[derive(Debug, Clone, Default)]
pub struct BoneTable {
    bones: Vec<BoneInfo>,
    by_name: HashMap<String, usize>,
}

impl BoneTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index for `name`, allocating the next index on first sight
    ///
    /// The offset matrix is recorded only when the bone is first seen.
    pub fn bone_id(&mut self, name: &str, offset: Mat4) -> usize {
        if let Some(&index) = self.by_name.get(name) {
            return index;
        }

        let index = self.bones.len();
        self.by_name.insert(name.to_string(), index);
        self.bones.push(BoneInfo {
            name: name.to_string(),
            offset,
        });
        index
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, index: usize) -> Option<&BoneInfo> {
        self.bones.get(index)
    }

    pub fn bones(&self) -> &[BoneInfo] {
        &self.bones
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Bone names ordered by index
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bones.iter().map(|b| b.name.as_str())
    }
}

/// Up to four (bone, weight) influences of one vertex
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VertexBoneData {
    pub ids: [u32; MAX_NUM_BONES_PER_VERTEX],
    pub weights: [f32; MAX_NUM_BONES_PER_VERTEX],
    count: usize,
}

/// Outcome of adding an influence to a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoneDataResult {
    Added,
    /// Weight was exactly zero
    ZeroWeight,
    /// This bone already influences the vertex
    Duplicate,
    /// All slots were taken
    Full,
}

impl VertexBoneData {
    /// Record an influence, ignoring zero weights, bones already bound to
    /// this vertex and influences beyond the fourth
    pub fn add_bone_data(&mut self, bone_id: u32, weight: f32) -> BoneDataResult {
        if self.ids[..self.count].contains(&bone_id) {
            return BoneDataResult::Duplicate;
        }

        if weight == 0.0 {
            return BoneDataResult::ZeroWeight;
        }

        if self.count == MAX_NUM_BONES_PER_VERTEX {
            return BoneDataResult::Full;
        }

        self.ids[self.count] = bone_id;
        self.weights[self.count] = weight;
        self.count += 1;
        BoneDataResult::Added
    }

    /// Number of influences recorded
    pub fn count(&self) -> usize {
        self.count
    }

    /// Iterate over recorded `(bone id, weight)` pairs
    pub fn influences(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        self.ids[..self.count]
            .iter()
            .copied()
            .zip(self.weights[..self.count].iter().copied())
    }

    pub fn total_weight(&self) -> f32 {
        self.weights[..self.count].iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_bone_ids_first_seen_order() {
        let mut table = BoneTable::new();
        let offset = Mat4::from_translation(Vec3::X);

        assert_eq!(table.bone_id("Hips", offset), 0);
        assert_eq!(table.bone_id("Spine", Mat4::IDENTITY), 1);
        assert_eq!(table.bone_id("Hips", Mat4::IDENTITY), 0);
        assert_eq!(table.bone_id("Arm", Mat4::IDENTITY), 2);

        assert_eq!(table.len(), 3);
        assert_eq!(table.index_of("Spine"), Some(1));
        assert_eq!(table.get(0).unwrap().offset, offset);
        assert_eq!(table.names().collect::<Vec<_>>(), ["Hips", "Spine", "Arm"]);
    }

    #[test]
    fn test_add_bone_data() {
        let mut v = VertexBoneData::default();

        assert_eq!(v.add_bone_data(3, 0.5), BoneDataResult::Added);
        assert_eq!(v.add_bone_data(3, 0.2), BoneDataResult::Duplicate);
        assert_eq!(v.add_bone_data(4, 0.0), BoneDataResult::ZeroWeight);
        assert_eq!(v.add_bone_data(5, 0.25), BoneDataResult::Added);
        assert_eq!(v.add_bone_data(6, 0.125), BoneDataResult::Added);
        assert_eq!(v.add_bone_data(7, 0.125), BoneDataResult::Added);
        assert_eq!(v.add_bone_data(8, 0.1), BoneDataResult::Full);

        assert_eq!(v.count(), 4);
        assert_eq!(v.ids, [3, 5, 6, 7]);
        assert!((v.total_weight() - 1.0).abs() < 1e-6);
        assert_eq!(
            v.influences().collect::<Vec<_>>(),
            [(3, 0.5), (5, 0.25), (6, 0.125), (7, 0.125)]
        );
    }
}
