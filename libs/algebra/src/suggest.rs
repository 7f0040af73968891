//! Near-match suggestions for unknown names

/// How many candidate names an "unrecognized expression" diagnostic carries.
pub const MAX_SUGGESTIONS: usize = 11;

/// Case-insensitive Levenshtein distance, two-row formulation.
pub fn distance(a: &str, b: &str) -> usize {
    let b_len = b.chars().count();
    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0usize; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.chars().enumerate() {
            let deletion = prev[j + 1] + 1;
            let insertion = curr[j] + 1;
            let substitution = prev[j] + usize::from(!ca.eq_ignore_ascii_case(&cb));
            curr[j + 1] = deletion.min(insertion).min(substitution);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Up to `limit` candidates closest to `token`, ascending by distance.
/// Ties break alphabetically so diagnostics are stable.
pub fn closest<'a, I>(token: &str, names: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut scored: Vec<(usize, &str)> = names
        .into_iter()
        .map(|name| (distance(token, name), name))
        .collect();
    scored.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    scored.truncate(limit);
    scored.into_iter().map(|(_, name)| name.to_string()).collect()
}
