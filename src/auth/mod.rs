pub mod oauth1;

pub use oauth1::OAuth1Signer;

use crate::app::Result;

/// Adds authentication material to an outgoing request.
///
/// Implementations must only touch headers or query parameters that carry
/// the signature; the method, target and other headers are left alone.
pub trait Signer {
    fn sign(&self, request: &mut reqwest::Request) -> Result<()>;
}
