//! Opaque cursor and page envelope primitives shared by list endpoints.
//!
//! Cursors are URL-safe base64 over a small JSON document so clients treat
//! them as opaque tokens while the backend keeps them self-describing. A
//! cursor never leaks row identifiers beyond what the listing itself
//! already exposes.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Errors raised while decoding a client-supplied cursor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    /// The token is not valid URL-safe base64.
    #[error("cursor is not valid base64")]
    Encoding,
    /// The decoded bytes are not the expected JSON document.
    #[error("cursor payload is malformed")]
    Payload,
}

/// Opaque pagination cursor wrapping a serialisable position marker.
///
/// # Examples
/// ```
/// use pagination::Cursor;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize, PartialEq, Debug)]
/// struct Position { offset: u32 }
///
/// let token = Cursor::encode(&Position { offset: 40 }).expect("encodes");
/// let decoded: Position = Cursor::decode(&token).expect("decodes");
/// assert_eq!(decoded, Position { offset: 40 });
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor;

impl Cursor {
    /// Encode a position marker into an opaque token.
    ///
    /// # Errors
    /// Returns [`CursorError::Payload`] when the marker cannot be
    /// serialised to JSON.
    pub fn encode<T: Serialize>(position: &T) -> Result<String, CursorError> {
        let bytes = serde_json::to_vec(position).map_err(|_| CursorError::Payload)?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Decode an opaque token back into a position marker.
    ///
    /// # Errors
    /// Returns [`CursorError::Encoding`] for invalid base64 and
    /// [`CursorError::Payload`] for valid base64 holding unexpected JSON.
    pub fn decode<T: DeserializeOwned>(token: &str) -> Result<T, CursorError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| CursorError::Encoding)?;
        serde_json::from_slice(&bytes).map_err(|_| CursorError::Payload)
    }
}

/// Clamp bounds for client-requested page sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    /// Page size applied when the client sends none.
    pub default: u32,
    /// Upper bound applied to any requested size.
    pub max: u32,
}

impl PageLimits {
    /// Resolve a requested page size against these limits.
    ///
    /// # Examples
    /// ```
    /// use pagination::PageLimits;
    ///
    /// let limits = PageLimits { default: 20, max: 100 };
    /// assert_eq!(limits.resolve(None), 20);
    /// assert_eq!(limits.resolve(Some(500)), 100);
    /// assert_eq!(limits.resolve(Some(0)), 20);
    /// ```
    #[must_use]
    pub fn resolve(&self, requested: Option<u32>) -> u32 {
        match requested {
            None | Some(0) => self.default,
            Some(n) => n.min(self.max),
        }
    }
}

/// Page envelope returned by cursor-paginated endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items in request order.
    pub items: Vec<T>,
    /// Cursor for the next page, absent on the final page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Build a page from one-more-than-requested items: when `items`
    /// exceeds `limit`, the extra row is dropped and a cursor is derived
    /// from the last retained item.
    ///
    /// # Errors
    /// Propagates [`CursorError`] from cursor encoding.
    pub fn from_overfetch<P, F>(
        mut items: Vec<T>,
        limit: u32,
        position: F,
    ) -> Result<Self, CursorError>
    where
        P: Serialize,
        F: FnOnce(&T) -> P,
    {
        let limit = limit as usize;
        if items.len() > limit {
            items.truncate(limit);
            let next_cursor = match items.last() {
                Some(last) => Some(Cursor::encode(&position(last))?),
                None => None,
            };
            Ok(Self { items, next_cursor })
        } else {
            Ok(Self {
                items,
                next_cursor: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    struct Marker {
        offset: u32,
    }

    #[rstest]
    fn cursor_round_trips() {
        let token = Cursor::encode(&Marker { offset: 7 }).expect("encode");
        let decoded: Marker = Cursor::decode(&token).expect("decode");
        assert_eq!(decoded.offset, 7);
    }

    #[rstest]
    #[case("not base64!!")]
    #[case("////")]
    fn cursor_rejects_invalid_base64(#[case] token: &str) {
        let err = Cursor::decode::<Marker>(token).expect_err("must fail");
        assert_eq!(err, CursorError::Encoding);
    }

    #[rstest]
    fn cursor_rejects_foreign_payload() {
        let token = URL_SAFE_NO_PAD.encode(b"[1,2,3]");
        let err = Cursor::decode::<Marker>(&token).expect_err("must fail");
        assert_eq!(err, CursorError::Payload);
    }

    #[rstest]
    #[case(None, 20)]
    #[case(Some(0), 20)]
    #[case(Some(5), 5)]
    #[case(Some(1_000), 100)]
    fn limits_clamp_requests(#[case] requested: Option<u32>, #[case] expected: u32) {
        let limits = PageLimits {
            default: 20,
            max: 100,
        };
        assert_eq!(limits.resolve(requested), expected);
    }

    #[rstest]
    fn overfetch_emits_cursor_only_when_more_rows_exist() {
        let page = Page::from_overfetch(vec![1, 2, 3], 2, |last| Marker {
            offset: u32::try_from(*last).unwrap_or(0),
        })
        .expect("page");
        assert_eq!(page.items, vec![1, 2]);
        let marker: Marker = Cursor::decode(page.next_cursor.as_deref().expect("cursor")).expect("decode");
        assert_eq!(marker.offset, 2);

        let exact = Page::from_overfetch(vec![1, 2], 2, |_| Marker { offset: 0 }).expect("page");
        assert!(exact.next_cursor.is_none());
    }
}
