use std::mem::size_of;

/// The per-vertex inputs a scene may feed its vertex shader, in the order they
/// appear inside one interleaved record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Position,
    Color,
    TexCoord,
}

impl AttributeKind {
    pub fn components(self) -> usize {
        match self {
            AttributeKind::Position => 3,
            AttributeKind::Color => 3,
            AttributeKind::TexCoord => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub kind: AttributeKind,
    /// Shader input location, `layout (location = N)`.
    pub location: u32,
    pub components: usize,
    /// Byte offset inside one record.
    pub offset: usize,
}

/// Layout of an interleaved `f32` vertex record. Position always comes first,
/// then colour, then texture coordinates, each tightly packed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    const FLOAT: usize = size_of::<f32>();

    /// `aPos` only: 3 floats per vertex.
    pub fn position() -> Self {
        Self::from_kinds(&[AttributeKind::Position])
    }

    /// `aPos` + `aColor`: 6 floats per vertex.
    pub fn position_color() -> Self {
        Self::from_kinds(&[AttributeKind::Position, AttributeKind::Color])
    }

    /// `aPos` + `aTexCoord`: 5 floats per vertex.
    pub fn position_tex_coord() -> Self {
        Self::from_kinds(&[AttributeKind::Position, AttributeKind::TexCoord])
    }

    /// `aPos` + `aColor` + `aTexCoord`: 8 floats per vertex.
    pub fn position_color_tex_coord() -> Self {
        Self::from_kinds(&[
            AttributeKind::Position,
            AttributeKind::Color,
            AttributeKind::TexCoord,
        ])
    }

    fn from_kinds(kinds: &[AttributeKind]) -> Self {
        let mut offset = 0;
        let attributes = kinds
            .iter()
            .enumerate()
            .map(|(location, &kind)| {
                let attribute = VertexAttribute {
                    kind,
                    location: location as u32,
                    components: kind.components(),
                    offset,
                };
                offset += kind.components() * Self::FLOAT;
                attribute
            })
            .collect();
        Self { attributes }
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    pub fn floats_per_vertex(&self) -> usize {
        self.attributes.iter().map(|a| a.components).sum()
    }

    /// Bytes between the starts of two consecutive records.
    pub fn stride(&self) -> usize {
        self.floats_per_vertex() * Self::FLOAT
    }

    /// Byte offset of the `index`th attribute, `None` past the last one.
    pub fn offset(&self, index: usize) -> Option<usize> {
        self.attributes.get(index).map(|a| a.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offsets_from_counts(counts: &[usize]) -> Vec<usize> {
        (0..counts.len())
            .map(|k| 4 * counts[..k].iter().sum::<usize>())
            .collect()
    }

    #[test]
    fn test_stride_and_offsets_match_component_counts() {
        let cases = [
            (VertexLayout::position(), 3, vec![3]),
            (VertexLayout::position_color(), 6, vec![3, 3]),
            (VertexLayout::position_color_tex_coord(), 8, vec![3, 3, 2]),
        ];

        for (layout, floats, counts) in cases {
            assert_eq!(layout.floats_per_vertex(), floats);
            assert_eq!(layout.stride(), 4 * floats);

            let offsets: Vec<usize> = (0..counts.len())
                .map(|k| layout.offset(k).unwrap())
                .collect();
            assert_eq!(offsets, offsets_from_counts(&counts));
        }
    }

    #[test]
    fn test_textured_quad_offsets() {
        let layout = VertexLayout::position_color_tex_coord();
        assert_eq!(layout.offset(0), Some(0));
        assert_eq!(layout.offset(1), Some(12));
        assert_eq!(layout.offset(2), Some(24));
        assert_eq!(layout.offset(3), None);
        assert_eq!(layout.stride(), 32);
    }

    #[test]
    fn test_locations_follow_record_order() {
        let layout = VertexLayout::position_tex_coord();
        let kinds: Vec<_> = layout.attributes().iter().map(|a| (a.kind, a.location)).collect();
        assert_eq!(
            kinds,
            vec![(AttributeKind::Position, 0), (AttributeKind::TexCoord, 1)]
        );
        assert_eq!(layout.stride(), 20);
    }
}
