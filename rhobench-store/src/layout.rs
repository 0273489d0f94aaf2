use rhobench_core::ArraySchema;

/// Maps the tiles of a dense array onto its row-major cell order.
///
/// Tiles are numbered row-major over the tile grid. Cells inside a tile are
/// also row-major, so each tile is a sequence of contiguous runs along the
/// last dimension. Edge tiles are truncated to the domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLayout {
    extents: Vec<usize>,
    tiles: Vec<usize>,
    counts: Vec<usize>,
    strides: Vec<usize>,
}

impl TileLayout {
    /// Layout of a validated schema
    pub fn new(schema: &ArraySchema) -> Self {
        let extents: Vec<usize> = schema.extents().into_iter().map(|e| e as usize).collect();
        let tiles: Vec<usize> = schema.dimensions.iter().map(|d| d.tile as usize).collect();
        let counts = schema
            .dimensions
            .iter()
            .map(|d| d.tile_count() as usize)
            .collect();

        let mut strides = vec![1usize; extents.len()];
        for d in (0..extents.len().saturating_sub(1)).rev() {
            strides[d] = strides[d + 1] * extents[d + 1];
        }

        Self {
            extents,
            tiles,
            counts,
            strides,
        }
    }

    pub fn tile_count(&self) -> usize {
        self.counts.iter().product()
    }

    /// Origin and extent of tile `index` along each dimension
    fn bounds(&self, index: usize) -> Vec<(usize, usize)> {
        let mut rest = index;
        let mut bounds = vec![(0, 0); self.counts.len()];
        for d in (0..self.counts.len()).rev() {
            let c = rest % self.counts[d];
            rest /= self.counts[d];
            let origin = c * self.tiles[d];
            bounds[d] = (origin, self.tiles[d].min(self.extents[d] - origin));
        }
        bounds
    }

    /// Number of cells in tile `index`
    pub fn tile_cells(&self, index: usize) -> usize {
        self.bounds(index).iter().map(|&(_, len)| len).product()
    }

    /// Calls `f(start, len)` for each contiguous run of tile `index`, in the
    /// tile's own cell order. `start` is a row-major index into the whole array.
    pub fn for_each_run(&self, index: usize, mut f: impl FnMut(usize, usize)) {
        let bounds = self.bounds(index);
        let Some((&(last_origin, run), outer)) = bounds.split_last() else {
            return;
        };

        // Odometer over every dimension but the last
        let mut pos = vec![0usize; outer.len()];
        loop {
            let start = outer
                .iter()
                .zip(&pos)
                .zip(&self.strides)
                .map(|((&(origin, _), &p), &stride)| (origin + p) * stride)
                .sum::<usize>()
                + last_origin;
            f(start, run);

            let mut d = outer.len();
            loop {
                if d == 0 {
                    return;
                }
                d -= 1;
                pos[d] += 1;
                if pos[d] < outer[d].1 {
                    break;
                }
                pos[d] = 0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rhobench_core::{Attribute, DataType, Dimension, Shape3};

    fn runs(layout: &TileLayout, index: usize) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        layout.for_each_run(index, |start, len| out.push((start, len)));
        out
    }

    #[test]
    fn test_grid3_tiles_are_time_slices() {
        let schema = ArraySchema::grid3(
            Shape3::new(3, 4, 5),
            Attribute::new("temp", DataType::Float32),
        );
        let layout = TileLayout::new(&schema);
        assert_eq!(layout.tile_count(), 3);
        assert_eq!(layout.tile_cells(1), 20);

        let r = runs(&layout, 2);
        assert_eq!(r.len(), 4);
        assert_eq!(r[0], (40, 5));
        assert_eq!(r[3], (55, 5));
    }

    #[test]
    fn test_edge_tiles_are_truncated() {
        // 5 x 7 split into 2 x 3 tiles -> 3 x 3 tile grid
        let schema = ArraySchema::new(
            vec![Dimension::new("r", (0, 4), 2), Dimension::new("c", (0, 6), 3)],
            Attribute::new("v", DataType::UInt8),
        );
        let layout = TileLayout::new(&schema);
        assert_eq!(layout.tile_count(), 9);
        assert_eq!(layout.tile_cells(0), 6);
        assert_eq!(layout.tile_cells(2), 2);
        assert_eq!(layout.tile_cells(8), 1);

        assert_eq!(runs(&layout, 2), vec![(6, 1), (13, 1)]);
        assert_eq!(runs(&layout, 8), vec![(34, 1)]);
    }

    #[test]
    fn test_runs_cover_every_cell_once() {
        let schema = ArraySchema::new(
            vec![
                Dimension::new("a", (0, 4), 2),
                Dimension::new("b", (-3, 3), 3),
                Dimension::new("c", (10, 14), 4),
            ],
            Attribute::new("v", DataType::UInt8),
        );
        let layout = TileLayout::new(&schema);
        let mut seen = vec![0u8; schema.cell_count() as usize];
        for t in 0..layout.tile_count() {
            layout.for_each_run(t, |start, len| {
                for cell in &mut seen[start..start + len] {
                    *cell += 1;
                }
            });
        }
        assert!(seen.iter().all(|&n| n == 1));
    }

    #[test]
    fn test_one_dimensional_single_tile() {
        let layout = TileLayout::new(&ArraySchema::bytes(17));
        assert_eq!(layout.tile_count(), 1);
        assert_eq!(runs(&layout, 0), vec![(0, 17)]);
    }
}
