use bytes::Bytes;
use headers::ContentType;
use serde::Serialize;

use crate::RequestError;

/// The body of an HTTP request with its content type.
#[derive(Clone, derive_more::Debug)]
pub struct RequestBody {
    pub(crate) content_type: ContentType,
    #[debug(ignore)]
    pub(crate) data: Bytes,
}

impl RequestBody {
    /// Creates an `application/json` body from a serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Serialization`] if the value cannot be serialized.
    pub fn json<T>(value: &T) -> Result<Self, RequestError>
    where
        T: Serialize + ?Sized,
    {
        let data = serde_json::to_vec(value)
            .map_err(|error| RequestError::Serialization { error })?;
        Ok(Self {
            content_type: ContentType::json(),
            data: Bytes::from(data),
        })
    }

    /// Creates a `text/plain; charset=utf-8` body.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content_type: ContentType::text_utf8(),
            data: Bytes::from(text.into()),
        }
    }

    /// Creates a body with an explicit content type.
    pub fn raw(data: impl Into<Bytes>, content_type: mime::Mime) -> Self {
        Self {
            content_type: ContentType::from(content_type),
            data: data.into(),
        }
    }

    /// The body content type.
    pub fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    /// The encoded body.
    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Echo {
        message_text: String,
    }

    #[test]
    fn should_encode_json_body() {
        let body = RequestBody::json(&Echo {
            message_text: "hello".to_string(),
        })
        .expect("serializable");

        assert_eq!(body.content_type(), &ContentType::json());
        insta::assert_snapshot!(String::from_utf8_lossy(body.data()), @r#"{"messageText":"hello"}"#);
    }

    #[test]
    fn should_keep_raw_content_type() {
        let body = RequestBody::raw(vec![1_u8, 2, 3], mime::APPLICATION_OCTET_STREAM);

        assert_eq!(body.content_type(), &ContentType::octet_stream());
        assert_eq!(body.data().as_ref(), &[1, 2, 3]);
    }
}
