pub type SerdePathError = serde_path_to_error::Error<serde_json::Error>;

/// Decodes JSON while tracking the path to the first offending field, so that
/// a bad record deep inside a datafeed response points at itself.
pub trait SerdeResponseParseAsync {
    type Error;

    fn serde_parse_custom<T>(
        self,
    ) -> impl std::future::Future<Output = Result<T, Self::Error>> + Send
    where
        T: serde::de::DeserializeOwned;
}

impl SerdeResponseParseAsync for &str {
    type Error = SerdePathError;

    async fn serde_parse_custom<T>(self) -> Result<T, SerdePathError>
    where
        T: serde::de::DeserializeOwned,
    {
        serde_response_parse::<T>(self)
    }
}

pub fn serde_response_parse<T>(s: &str) -> Result<T, SerdePathError>
where
    T: serde::de::DeserializeOwned,
{
    serde_path_to_error::deserialize(&mut serde_json::Deserializer::from_str(s))
}
