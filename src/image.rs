//! Image path resolution.

/// Prefixes that mark a value as already usable by the UI.
const ABSOLUTE_PREFIXES: [&str; 3] = ["http://", "https://", "blob:"];

/// Resolve an image value against the backend origin.
///
/// Absolute (`http://`, `https://`) and `blob:` values pass through
/// unmodified; relative paths are joined to `origin` with exactly one `/`.
/// Empty values stay empty.
///
/// ```
/// use dynasty_admin::image::resolve_image_url;
///
/// assert_eq!(
///     resolve_image_url("/uploads/a.jpg", "https://api.example.com"),
///     "https://api.example.com/uploads/a.jpg"
/// );
/// ```
pub fn resolve_image_url(value: &str, origin: &str) -> String {
    if value.is_empty() || is_absolute(value) {
        return value.to_string();
    }

    format!(
        "{}/{}",
        origin.trim_end_matches('/'),
        value.trim_start_matches('/')
    )
}

/// Whether the value needs no resolution.
pub fn is_absolute(value: &str) -> bool {
    ABSOLUTE_PREFIXES.iter().any(|p| value.starts_with(p))
}

/// Resolve an optional image field in place.
pub(crate) fn resolve_in_place(image: &mut Option<String>, origin: &str) {
    if let Some(value) = image.as_mut() {
        *value = resolve_image_url(value, origin);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://api.example.com";

    #[test]
    fn test_relative_path_resolved() {
        assert_eq!(
            resolve_image_url("/uploads/a.jpg", ORIGIN),
            "https://api.example.com/uploads/a.jpg"
        );
        assert_eq!(
            resolve_image_url("uploads/a.jpg", "https://api.example.com/"),
            "https://api.example.com/uploads/a.jpg"
        );
    }

    #[test]
    fn test_absolute_values_pass_through() {
        for value in [
            "http://cdn.example.com/x.png",
            "https://cdn.example.com/x.png",
            "blob:https://admin.example.com/3f2a",
        ] {
            assert_eq!(resolve_image_url(value, ORIGIN), value);
        }
    }

    #[test]
    fn test_empty_stays_empty() {
        assert_eq!(resolve_image_url("", ORIGIN), "");
    }

    #[test]
    fn test_resolve_in_place() {
        let mut image = Some("/uploads/ghee.png".to_string());
        resolve_in_place(&mut image, ORIGIN);
        assert_eq!(image.as_deref(), Some("https://api.example.com/uploads/ghee.png"));

        let mut none: Option<String> = None;
        resolve_in_place(&mut none, ORIGIN);
        assert!(none.is_none());
    }
}
