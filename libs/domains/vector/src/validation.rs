//! Payload checks that run before any store is called.
//!
//! Dimension consistency is left to the index store, which knows its configured size.

use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::error::{VectorError, VectorResult};
use crate::models::{SearchRequest, VectorRecord};

pub fn validate_vector_record(record: &VectorRecord) -> VectorResult<()> {
    record.validate().map_err(to_vector_error)
}

pub fn validate_search_request(request: &SearchRequest) -> VectorResult<()> {
    request.validate().map_err(to_vector_error)
}

/// Flattens field errors into one message, e.g. `"k must be between 1 and 100"`.
fn to_vector_error(errors: ValidationErrors) -> VectorError {
    let mut messages: Vec<String> = errors
        .errors()
        .iter()
        .flat_map(|(field, kind)| match kind {
            ValidationErrorsKind::Field(errs) => errs
                .iter()
                .map(|e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{} is invalid ({})", field, e.code),
                })
                .collect::<Vec<_>>(),
            _ => vec![format!("{} is invalid", field)],
        })
        .collect();
    messages.sort();

    VectorError::Validation(messages.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MAX_ID_LEN;

    fn message(err: VectorError) -> String {
        match err {
            VectorError::Validation(msg) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_record_passes() {
        let record = VectorRecord::new("v1", vec![0.1, 0.2, 0.3]);
        assert!(validate_vector_record(&record).is_ok());
    }

    #[test]
    fn test_empty_id_is_rejected() {
        let err = validate_vector_record(&VectorRecord::new("", vec![0.1])).unwrap_err();
        assert_eq!(message(err), "id must be 1 to 255 characters");
    }

    #[test]
    fn test_id_length_limit() {
        let at_limit = "a".repeat(MAX_ID_LEN as usize);
        assert!(validate_vector_record(&VectorRecord::new(at_limit, vec![0.1])).is_ok());

        let over = "a".repeat(MAX_ID_LEN as usize + 1);
        assert!(validate_vector_record(&VectorRecord::new(over, vec![0.1])).is_err());
    }

    #[test]
    fn test_empty_embedding_is_rejected() {
        let err = validate_vector_record(&VectorRecord::new("v1", vec![])).unwrap_err();
        assert_eq!(message(err), "embedding must not be empty");
    }

    #[test]
    fn test_non_finite_embedding_is_rejected() {
        let err = validate_vector_record(&VectorRecord::new("v1", vec![0.1, f32::NAN])).unwrap_err();
        assert_eq!(message(err), "embedding values must be finite numbers");

        let request = SearchRequest::new(vec![f32::INFINITY], 5);
        assert!(validate_search_request(&request).is_err());
    }

    #[test]
    fn test_multiple_errors_are_joined() {
        let err = validate_vector_record(&VectorRecord::new("", vec![])).unwrap_err();
        assert_eq!(
            message(err),
            "embedding must not be empty; id must be 1 to 255 characters"
        );
    }

    #[test]
    fn test_k_bounds() {
        for k in [0, 101] {
            let err = validate_search_request(&SearchRequest::new(vec![0.1], k)).unwrap_err();
            assert_eq!(message(err), "k must be between 1 and 100");
        }
        for k in [1, 100] {
            assert!(validate_search_request(&SearchRequest::new(vec![0.1], k)).is_ok());
        }
    }

    #[test]
    fn test_empty_search_embedding_is_rejected() {
        assert!(validate_search_request(&SearchRequest::new(vec![], 10)).is_err());
    }
}
