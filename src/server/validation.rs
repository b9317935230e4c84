use crate::server::response::ApiError;

const MAX_REPO_NAME_LEN: usize = 100;

fn is_valid_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'
}

pub fn validate_repo_name(name: &str) -> Result<(), ApiError> {
    if name.is_empty() {
        return Err(ApiError::bad_request("Repository name cannot be empty"));
    }
    if name.len() > MAX_REPO_NAME_LEN {
        return Err(ApiError::bad_request(format!(
            "Repository name cannot exceed {MAX_REPO_NAME_LEN} characters"
        )));
    }
    if !name.chars().all(is_valid_name_char) {
        return Err(ApiError::bad_request(
            "Repository name can only contain alphanumeric characters, hyphens, underscores, and periods",
        ));
    }
    if name.starts_with('.') || name.ends_with(".git") {
        return Err(ApiError::bad_request(
            "Repository name cannot start with a period or end with .git",
        ));
    }
    Ok(())
}

/// Rejects requests whose required fields are empty.
pub fn require_fields(fields: &[&str]) -> Result<(), ApiError> {
    if fields.iter().any(|f| f.trim().is_empty()) {
        return Err(ApiError::bad_request("missing credentials"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_names() {
        for name in ["proj", "my-repo", "my_repo", "v1.2", "A1"] {
            assert!(validate_repo_name(name).is_ok(), "{name}");
        }
        let too_long = "a".repeat(101);
        for name in ["", "has space", "slash/name", ".hidden", "repo.git", &too_long] {
            assert!(validate_repo_name(name).is_err(), "{name}");
        }
    }

    #[test]
    fn test_require_fields() {
        assert!(require_fields(&["alice", "pw"]).is_ok());
        let err = require_fields(&["alice", "  "]).unwrap_err();
        assert_eq!(err.message, "missing credentials");
    }
}
