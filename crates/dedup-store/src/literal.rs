//! Vector literal encoding.

/// Encode a vector as the bracketed, comma-separated literal pgvector parses.
pub fn vector_literal(values: &[f32]) -> String {
    let mut literal = String::with_capacity(values.len() * 10 + 2);
    literal.push('[');
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            literal.push(',');
        }
        literal.push_str(&value.to_string());
    }
    literal.push(']');
    literal
}
