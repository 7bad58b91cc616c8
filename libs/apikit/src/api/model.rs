/// Marker trait for inbound payload models. This trait should only be
/// implemented via the `#[apikit_macros::api_model]` attribute macro.
#[doc(hidden)]
pub trait RequestModel {}

/// Marker trait for outbound payload models. This trait should only be
/// implemented via the `#[apikit_macros::api_model]` attribute macro.
#[doc(hidden)]
pub trait ResponseModel {}

// Container types pass the marker through to their element type.
impl<T: RequestModel> RequestModel for Vec<T> {}
impl<T: RequestModel> RequestModel for Option<T> {}
impl<T: RequestModel> RequestModel for Box<T> {}
impl RequestModel for serde_json::Value {}

impl<T: ResponseModel> ResponseModel for Vec<T> {}
impl<T: ResponseModel> ResponseModel for Option<T> {}
impl<T: ResponseModel> ResponseModel for Box<T> {}
impl ResponseModel for serde_json::Value {}
