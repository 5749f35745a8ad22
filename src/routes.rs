//! Client-visible routes: `/`, `/person/:name`, `/conversation/:id`.

use std::fmt;

/// A page the user can navigate to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Person(String),
    Conversation(String),
}

impl Route {
    /// Parse a route path. Identifiers are percent-decoded; a trailing
    /// slash is ignored.
    pub fn parse(path: &str) -> Result<Self, String> {
        let trimmed = path.trim();
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);

        if trimmed.is_empty() {
            return Ok(Route::Dashboard);
        }

        let segments: Vec<&str> = trimmed.trim_start_matches('/').split('/').collect();
        match segments.as_slice() {
            ["person", name] => Ok(Route::Person(decode_segment(name)?)),
            ["conversation", id] => Ok(Route::Conversation(decode_segment(id)?)),
            _ => Err(format!(
                "Unknown route '{}'. Expected /, /person/<name> or /conversation/<id>",
                path
            )),
        }
    }

    /// Path for this route with the identifier percent-encoded.
    pub fn path(&self) -> String {
        match self {
            Route::Dashboard => "/".to_string(),
            Route::Person(name) => format!("/person/{}", urlencoding::encode(name)),
            Route::Conversation(id) => format!("/conversation/{}", urlencoding::encode(id)),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

fn decode_segment(segment: &str) -> Result<String, String> {
    let decoded = urlencoding::decode(segment)
        .map_err(|e| format!("Invalid route segment '{}': {}", segment, e))?;
    if decoded.is_empty() {
        return Err("Route identifier must not be empty".to_string());
    }
    Ok(decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dashboard() {
        assert_eq!(Route::parse("/"), Ok(Route::Dashboard));
        assert_eq!(Route::parse(""), Ok(Route::Dashboard));
    }

    #[test]
    fn test_parse_person_decodes_name() {
        assert_eq!(
            Route::parse("/person/Mary%20Ann"),
            Ok(Route::Person("Mary Ann".to_string()))
        );
        assert_eq!(
            Route::parse("/person/Alice/"),
            Ok(Route::Person("Alice".to_string()))
        );
    }

    #[test]
    fn test_parse_conversation() {
        assert_eq!(
            Route::parse("/conversation/65f0a1"),
            Ok(Route::Conversation("65f0a1".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_unknown_routes() {
        assert!(Route::parse("/people").is_err());
        assert!(Route::parse("/person").is_err());
        assert!(Route::parse("/person/a/b").is_err());
        assert!(Route::parse("/person/").is_err());
    }

    #[test]
    fn test_path_encodes_identifier() {
        let route = Route::Person("Mary Ann".to_string());
        assert_eq!(route.path(), "/person/Mary%20Ann");
        assert_eq!(Route::parse(&route.path()), Ok(route));
        assert_eq!(Route::Dashboard.to_string(), "/");
    }
}
