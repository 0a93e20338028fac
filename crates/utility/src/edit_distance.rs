use std::{
    cmp::min,
    ops::{Index, IndexMut},
};

#[derive(Debug, Clone)]
struct Matrix<T: Clone> {
    data: Vec<T>,
    cols: usize,
}

impl<T: Clone> Matrix<T> {
    fn new(rows: usize, cols: usize, fill: T) -> Self {
        Self {
            data: vec![fill; rows * cols],
            cols,
        }
    }
}

impl<T: Clone> Index<(usize, usize)> for Matrix<T> {
    type Output = T;
    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.data[row * self.cols + col]
    }
}

impl<T: Clone> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        &mut self.data[row * self.cols + col]
    }
}

fn min3<T: Ord>(v1: T, v2: T, v3: T) -> T {
    min(v1, min(v2, v3))
}

/// Levenshtein distance between two words, counted in characters and
/// ignoring ascii case.
pub fn edit_distance(word1: &str, word2: &str) -> usize {
    let a = word1.to_ascii_lowercase().chars().collect::<Vec<_>>();
    let b = word2.to_ascii_lowercase().chars().collect::<Vec<_>>();
    let mut cache = Matrix::<usize>::new(a.len() + 1, b.len() + 1, usize::MAX);

    for i in 0..=a.len() {
        cache[(i, b.len())] = a.len() - i;
    }
    for j in 0..=b.len() {
        cache[(a.len(), j)] = b.len() - j;
    }

    for i in (0..a.len()).rev() {
        for j in (0..b.len()).rev() {
            cache[(i, j)] = if a[i] == b[j] {
                cache[(i + 1, j + 1)]
            } else {
                1 + min3(
                    cache[(i + 1, j)],
                    cache[(i, j + 1)],
                    cache[(i + 1, j + 1)],
                )
            };
        }
    }

    cache[(0, 0)]
}

/// Returns the candidate closest to `word`, if any is within `max_distance`.
pub fn closest<'a, I>(word: &str, candidates: I, max_distance: usize) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .map(|candidate| (edit_distance(word, candidate), candidate))
        .filter(|(distance, _)| *distance <= max_distance)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate)
}
