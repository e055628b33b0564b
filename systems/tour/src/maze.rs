//! Tours that wrap around a random spanning tree of 2x2 blocks.
//!
//! Every block of four cells starts out as a small square loop. Each tree edge
//! between two neighbouring blocks cuts the facing sides of both squares and
//! bridges them with two parallel links, merging the loops. Because the tree
//! spans every block, the merged loops form one cycle through the whole grid.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use snake_pilot_core::{Cell, Direction, GridSize};

/// Builds a tour around a spanning tree carved with the seeded generator.
///
/// The caller guarantees both dimensions are even and at least two.
pub(crate) fn maze_tour(grid: GridSize, seed: u64) -> Vec<Cell> {
    let blocks = GridSize::new(grid.width() / 2, grid.height() / 2);
    let tree = SpanningTree::carve(blocks, seed);
    let links = tree.cell_links(grid);
    walk_links(grid, &links)
}

/// Tree edges stored per block as "linked to the right" and "linked below".
#[derive(Debug)]
struct SpanningTree {
    blocks: GridSize,
    right: Vec<bool>,
    down: Vec<bool>,
}

impl SpanningTree {
    /// Randomised depth-first carve starting at the top-left block.
    fn carve(blocks: GridSize, seed: u64) -> Self {
        let block_count = blocks.cell_count();
        let mut tree = Self {
            blocks,
            right: vec![false; block_count],
            down: vec![false; block_count],
        };
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut visited = vec![false; block_count];
        let mut stack = vec![Cell::new(0, 0)];
        visited[0] = true;

        while let Some(&current) = stack.last() {
            let open: Vec<Cell> = blocks
                .neighbors(current)
                .filter(|block| blocks.index_of(*block).map_or(false, |index| !visited[index]))
                .collect();

            if open.is_empty() {
                let _ = stack.pop();
                continue;
            }

            let next = open[rng.gen_range(0..open.len())];
            if let Some(index) = blocks.index_of(next) {
                visited[index] = true;
            }
            tree.join(current, next);
            stack.push(next);
        }

        tree
    }

    fn join(&mut self, a: Cell, b: Cell) {
        let (first, second) = if (a.y(), a.x()) < (b.y(), b.x()) {
            (a, b)
        } else {
            (b, a)
        };
        let Some(index) = self.blocks.index_of(first) else {
            return;
        };

        if second.y() == first.y() {
            self.right[index] = true;
        } else {
            self.down[index] = true;
        }
    }

    fn links_right(&self, block: Cell) -> bool {
        self.blocks
            .index_of(block)
            .map_or(false, |index| self.right[index])
    }

    fn links_down(&self, block: Cell) -> bool {
        self.blocks
            .index_of(block)
            .map_or(false, |index| self.down[index])
    }

    /// Per-cell adjacency of the merged loop, one direction bit per link.
    fn cell_links(&self, grid: GridSize) -> Vec<u8> {
        let mut links = vec![0u8; grid.cell_count()];

        for block in self.blocks.cells() {
            let (x0, y0) = (block.x() * 2, block.y() * 2);
            let top_left = Cell::new(x0, y0);
            let top_right = Cell::new(x0 + 1, y0);
            let bottom_left = Cell::new(x0, y0 + 1);
            let bottom_right = Cell::new(x0 + 1, y0 + 1);

            let joined_up = block.y() > 0 && self.links_down(Cell::new(block.x(), block.y() - 1));
            let joined_left =
                block.x() > 0 && self.links_right(Cell::new(block.x() - 1, block.y()));
            let joined_right = self.links_right(block);
            let joined_down = self.links_down(block);

            if !joined_up {
                link(grid, &mut links, top_left, top_right);
            }
            if !joined_down {
                link(grid, &mut links, bottom_left, bottom_right);
            }
            if !joined_left {
                link(grid, &mut links, top_left, bottom_left);
            }
            if !joined_right {
                link(grid, &mut links, top_right, bottom_right);
            } else {
                link(grid, &mut links, top_right, Cell::new(x0 + 2, y0));
                link(grid, &mut links, bottom_right, Cell::new(x0 + 2, y0 + 1));
            }
            if joined_down {
                link(grid, &mut links, bottom_left, Cell::new(x0, y0 + 2));
                link(grid, &mut links, bottom_right, Cell::new(x0 + 1, y0 + 2));
            }
        }

        links
    }
}

fn direction_bit(direction: Direction) -> u8 {
    match direction {
        Direction::Up => 0b0001,
        Direction::Down => 0b0010,
        Direction::Left => 0b0100,
        Direction::Right => 0b1000,
    }
}

fn link(grid: GridSize, links: &mut [u8], a: Cell, b: Cell) {
    let Some(direction) = Direction::between(a, b) else {
        return;
    };
    if let (Some(from), Some(to)) = (grid.index_of(a), grid.index_of(b)) {
        links[from] |= direction_bit(direction);
        links[to] |= direction_bit(direction.opposite());
    }
}

/// Follows the links from `(0, 0)` until the walk returns to the start.
fn walk_links(grid: GridSize, links: &[u8]) -> Vec<Cell> {
    let start = Cell::new(0, 0);
    let cell_count = grid.cell_count();
    let mut order = Vec::with_capacity(cell_count);
    let mut previous: Option<Cell> = None;
    let mut current = start;

    while order.len() < cell_count {
        order.push(current);

        let mask = grid
            .index_of(current)
            .and_then(|index| links.get(index).copied())
            .unwrap_or(0);
        let next = Direction::ALL
            .into_iter()
            .filter(|direction| mask & direction_bit(*direction) != 0)
            .filter_map(|direction| current.step(direction, grid))
            .find(|cell| Some(*cell) != previous);

        match next {
            Some(cell) if cell != start => {
                previous = Some(current);
                current = cell;
            }
            _ => break,
        }
    }

    order
}
