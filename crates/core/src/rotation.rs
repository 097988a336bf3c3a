/// One row of a rotation table: participant `from` moves to variant `to` (both 1-based).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rotation {
    pub from: usize,
    pub to: usize,
}

/// Shifts `count` variants by `offset`, keeping at most `limit` rows.
pub fn rotation_table(count: usize, offset: usize, limit: Option<usize>) -> Vec<Rotation> {
    if count == 0 {
        return Vec::new();
    }

    (0..count)
        .map(|index| Rotation { from: index + 1, to: (index + offset % count) % count + 1 })
        .take(limit.unwrap_or(count))
        .collect()
}

pub fn render_rotation_table(rows: &[Rotation]) -> String {
    rows.iter().map(|row| format!("{} => {}", row.from, row.to)).collect::<Vec<_>>().join("\n")
}
