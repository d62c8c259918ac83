//! PJAX request detection.

use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use quill_core::constants::{PJAX_CGI_HEADER, PJAX_HEADER};

/// True when the request came from a PJAX client and wants the page
/// without its layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pjax(pub bool);

#[async_trait]
impl<S> FromRequestParts<S> for Pjax
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let headers = &parts.headers;
        Ok(Pjax(
            headers.contains_key(PJAX_HEADER) || headers.contains_key(PJAX_CGI_HEADER),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn detect(header: Option<&str>) -> bool {
        let mut builder = Request::builder().uri("/articles");
        if let Some(name) = header {
            builder = builder.header(name, "true");
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        let Pjax(pjax) = Pjax::from_request_parts(&mut parts, &()).await.unwrap();
        pjax
    }

    #[tokio::test]
    async fn test_detects_pjax_headers() {
        assert!(detect(Some("X-PJAX")).await);
        assert!(detect(Some("HTTP_X_PJAX")).await);
        assert!(!detect(None).await);
        assert!(!detect(Some("X-Requested-With")).await);
    }
}
