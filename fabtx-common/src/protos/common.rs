use prost::Message;

/// Kind of transaction carried by a [`ChainHeader`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum HeaderType {
    Message = 0,
    ConfigurationTransaction = 1,
    ConfigurationItem = 2,
    EndorserTransaction = 3,
}

#[derive(Clone, PartialEq, Message)]
pub struct Timestamp {
    #[prost(int64, tag = "1")]
    pub seconds: i64,
    #[prost(int32, tag = "2")]
    pub nanos: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct ChainHeader {
    #[prost(enumeration = "HeaderType", tag = "1")]
    pub r#type: i32,
    #[prost(int32, tag = "2")]
    pub version: i32,
    #[prost(message, optional, tag = "3")]
    pub timestamp: Option<Timestamp>,
    #[prost(string, tag = "4")]
    pub chain_id: String,
    #[prost(string, tag = "5")]
    pub tx_id: String,
    #[prost(uint64, tag = "6")]
    pub epoch: u64,
    /// Type-specific extension; an encoded `ChaincodeHeaderExtension` for
    /// endorser transactions.
    #[prost(bytes = "vec", tag = "7")]
    pub extension: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct SignatureHeader {
    /// Serialized identity of the party that created the message.
    #[prost(bytes = "vec", tag = "1")]
    pub creator: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub nonce: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Header {
    #[prost(message, optional, tag = "1")]
    pub chain_header: Option<ChainHeader>,
    #[prost(message, optional, tag = "2")]
    pub signature_header: Option<SignatureHeader>,
}

/// Body of an [`Envelope`].
#[derive(Clone, PartialEq, Message)]
pub struct Payload {
    #[prost(message, optional, tag = "1")]
    pub header: Option<Header>,
    /// Encoded `Transaction` for endorser transactions.
    #[prost(bytes = "vec", tag = "2")]
    pub data: Vec<u8>,
}

/// Outermost unit handed to ordering. Unsigned envelopes carry an empty
/// signature and must not be submitted.
#[derive(Clone, PartialEq, Message)]
pub struct Envelope {
    #[prost(bytes = "vec", tag = "1")]
    pub payload: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub signature: Vec<u8>,
}

impl Envelope {
    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty()
    }
}
