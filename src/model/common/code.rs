/// Derive a subject code from its title: uppercase, with spaces replaced by hyphens.
///
/// A blank title produces an empty code.
pub fn generate_code(title: &str) -> String {
    if title.trim().is_empty() {
        return String::new();
    }
    title.to_uppercase().replace(' ', "-")
}
