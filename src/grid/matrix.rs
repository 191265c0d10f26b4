use std::ops::RangeInclusive;

/// Dense day × column matrix, stored row-major by day
///
/// Days are 1-based and contiguous (`1..=end_day`); columns are 0-based
/// indexes into the canonical station list.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    end_day: u32,
    width: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn filled(end_day: u32, width: usize, value: T) -> Self {
        Self {
            end_day,
            width,
            cells: vec![value; end_day as usize * width],
        }
    }
}

impl<T> Grid<T> {
    pub fn from_fn(end_day: u32, width: usize, mut f: impl FnMut(u32, usize) -> T) -> Self {
        let mut cells = Vec::with_capacity(end_day as usize * width);
        for day in 1..=end_day {
            for column in 0..width {
                cells.push(f(day, column));
            }
        }
        Self {
            end_day,
            width,
            cells,
        }
    }

    pub fn end_day(&self) -> u32 {
        self.end_day
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn days(&self) -> RangeInclusive<u32> {
        1..=self.end_day
    }

    fn offset(&self, day: u32, column: usize) -> Option<usize> {
        if day == 0 || day > self.end_day || column >= self.width {
            return None;
        }
        Some((day as usize - 1) * self.width + column)
    }

    pub fn get(&self, day: u32, column: usize) -> Option<&T> {
        self.offset(day, column).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, day: u32, column: usize) -> Option<&mut T> {
        self.offset(day, column).map(|i| &mut self.cells[i])
    }

    /// All cells of one day, in column order
    pub fn row(&self, day: u32) -> Option<&[T]> {
        if day == 0 || day > self.end_day {
            return None;
        }
        let start = (day as usize - 1) * self.width;
        Some(&self.cells[start..start + self.width])
    }

    /// All cells of one column, in ascending day order
    pub fn column(&self, column: usize) -> impl Iterator<Item = &T> + '_ {
        let take = if column < self.width {
            self.end_day as usize
        } else {
            0
        };
        self.cells
            .iter()
            .skip(column)
            .step_by(self.width.max(1))
            .take(take)
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            end_day: self.end_day,
            width: self.width,
            cells: self.cells.iter().map(&mut f).collect(),
        }
    }

    /// Combine two grids of the same shape cell by cell
    pub fn zip_map<U, V>(&self, other: &Grid<U>, mut f: impl FnMut(&T, &U) -> V) -> Grid<V> {
        assert!(
            self.end_day == other.end_day && self.width == other.width,
            "grid shapes differ: {}x{} vs {}x{}",
            self.end_day,
            self.width,
            other.end_day,
            other.width
        );
        Grid {
            end_day: self.end_day,
            width: self.width,
            cells: self
                .cells
                .iter()
                .zip(other.cells.iter())
                .map(|(a, b)| f(a, b))
                .collect(),
        }
    }
}
