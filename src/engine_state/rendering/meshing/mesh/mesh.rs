use crate::engine_state::rendering::PackedVertex;

use super::face::Face;

/// Which column buffer a part of a mesh is uploaded to.
///
/// Solid geometry is drawn before water so translucent surfaces blend over it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MeshKind {
    Solid = 0,
    Water = 1,
}

impl MeshKind {
    /// Both kinds, in draw order.
    pub const ALL: [MeshKind; 2] = [MeshKind::Solid, MeshKind::Water];
}

/// The geometry of one chunk: non-indexed triangle lists of packed vertices.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkMesh {
    /// Opaque faces
    pub solid: Vec<PackedVertex>,
    /// Liquid faces
    pub water: Vec<PackedVertex>,
}

impl ChunkMesh {
    /// Creates a new, empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the two triangles of `face` to the list matching its block type.
    pub fn add_face(&mut self, face: &Face) {
        let target = if face.block_type.is_liquid() {
            &mut self.water
        } else {
            &mut self.solid
        };
        target.extend_from_slice(&face.vertices());
    }

    /// The vertices destined for the buffer of `kind`.
    pub fn vertices(&self, kind: MeshKind) -> &[PackedVertex] {
        match kind {
            MeshKind::Solid => &self.solid,
            MeshKind::Water => &self.water,
        }
    }

    /// The vertices of `kind` as raw bytes, ready for upload.
    pub fn bytes(&self, kind: MeshKind) -> &[u8] {
        bytemuck::cast_slice(self.vertices(kind))
    }

    /// Total number of vertices over both lists.
    pub fn vertex_count(&self) -> usize {
        self.solid.len() + self.water.len()
    }

    /// Returns `true` if the mesh has no geometry at all.
    pub fn is_empty(&self) -> bool {
        self.vertex_count() == 0
    }
}
