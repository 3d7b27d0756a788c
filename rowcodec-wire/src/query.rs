//! Query request messages.

use crate::document::{
    decode_i64, decode_string, encode_binary, encode_document, encode_prefix, ElementType,
    LenWriter, Reader, ValueDecoder,
};
use bytes::{BufMut, Bytes, BytesMut};
use rowcodec_core::{BindVars, CodecConfig, CodecError, CodecResult, WireError};
use tracing::{debug, warn};

const SQL: &str = "Sql";
const BIND_VARIABLES: &str = "BindVariables";
const TRANSACTION_ID: &str = "TransactionId";
const CONNECTION_ID: &str = "ConnectionId";
const SESSION_ID: &str = "SessionId";

/// One query request as carried on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryMessage {
    pub sql: String,
    pub bind_variables: BindVars,
    pub transaction_id: i64,
    pub connection_id: i64,
    pub session_id: i64,
}

impl QueryMessage {
    pub fn new(sql: impl Into<String>, bind_variables: BindVars) -> Self {
        Self {
            sql: sql.into(),
            bind_variables,
            ..Self::default()
        }
    }

    /// Encode into a freshly allocated buffer.
    pub fn encode(&self) -> CodecResult<Bytes> {
        let mut buf = BytesMut::with_capacity(64 + self.sql.len());
        self.encode_to(&mut buf)?;
        Ok(buf.freeze())
    }

    /// Append the encoded message to `buf`.
    ///
    /// Fields are always written in the order `Sql`, `BindVariables`,
    /// `TransactionId`, `ConnectionId`, `SessionId`.
    pub fn encode_to(&self, buf: &mut BytesMut) -> CodecResult<()> {
        let len_writer = LenWriter::new(buf);

        encode_prefix(buf, ElementType::Binary, SQL)?;
        encode_binary(buf, self.sql.as_bytes())?;

        encode_prefix(buf, ElementType::Object, BIND_VARIABLES)?;
        encode_document(buf, &self.bind_variables)?;

        encode_prefix(buf, ElementType::Long, TRANSACTION_ID)?;
        buf.put_i64_le(self.transaction_id);

        encode_prefix(buf, ElementType::Long, CONNECTION_ID)?;
        buf.put_i64_le(self.connection_id);

        encode_prefix(buf, ElementType::Long, SESSION_ID)?;
        buf.put_i64_le(self.session_id);

        buf.put_u8(ElementType::Eoo.as_byte());
        len_writer.record_len(buf)?;
        Ok(())
    }

    /// Decode a buffer holding exactly one message, with default limits.
    pub fn decode(bytes: &[u8]) -> CodecResult<Self> {
        Self::decode_with(bytes, &CodecConfig::default())
    }

    /// Decode a buffer holding exactly one message.
    pub fn decode_with(bytes: &[u8], config: &CodecConfig) -> CodecResult<Self> {
        let (message, consumed) = Self::decode_prefix_with(bytes, config)?;
        if consumed != bytes.len() {
            return Err(WireError::TrailingBytes {
                count: bytes.len() - consumed,
            }
            .into());
        }
        Ok(message)
    }

    /// Decode the message at the front of `bytes`, with default limits.
    ///
    /// Returns the message and the number of bytes it occupied.
    pub fn decode_prefix(bytes: &[u8]) -> CodecResult<(Self, usize)> {
        Self::decode_prefix_with(bytes, &CodecConfig::default())
    }

    /// Decode the message at the front of `bytes`.
    ///
    /// An invalid `config` is reported as a config error before any byte is
    /// read.
    pub fn decode_prefix_with(bytes: &[u8], config: &CodecConfig) -> CodecResult<(Self, usize)> {
        config.validate()?;
        let result = check_declared_len(bytes, config).and_then(|()| {
            let mut reader = Reader::new(bytes);
            let message = Self::decode_fields(&mut reader, config)?;
            Ok((message, bytes.len() - reader.remaining()))
        });

        match result {
            Ok((message, consumed)) => {
                debug!(
                    sql_len = message.sql.len(),
                    bind_variables = message.bind_variables.len(),
                    transaction_id = message.transaction_id,
                    connection_id = message.connection_id,
                    session_id = message.session_id,
                    "decoded query message"
                );
                Ok((message, consumed))
            }
            Err(err) => {
                if matches!(
                    err,
                    WireError::UnrecognizedField { .. } | WireError::UnexpectedType { .. }
                ) {
                    warn!(error = %err, "rejected query message");
                }
                Err(CodecError::from(err))
            }
        }
    }

    fn decode_fields(reader: &mut Reader<'_>, config: &CodecConfig) -> Result<Self, WireError> {
        let values = ValueDecoder::new(config);
        let mut elements = reader.open_document()?;
        let mut message = Self::default();

        while let Some((tag, name)) = elements.next_element()? {
            match name {
                SQL => message.sql = decode_string(&mut elements, tag, SQL)?,
                BIND_VARIABLES => match ElementType::from_byte(tag) {
                    Some(ElementType::Object) => {
                        message.bind_variables = values.decode_bind_vars(&mut elements, 2)?;
                    }
                    Some(ElementType::Null) => message.bind_variables = BindVars::new(),
                    _ => {
                        return Err(WireError::UnexpectedType {
                            field: BIND_VARIABLES.to_string(),
                            tag,
                        })
                    }
                },
                TRANSACTION_ID => {
                    message.transaction_id = decode_i64(&mut elements, tag, TRANSACTION_ID)?
                }
                CONNECTION_ID => {
                    message.connection_id = decode_i64(&mut elements, tag, CONNECTION_ID)?
                }
                SESSION_ID => message.session_id = decode_i64(&mut elements, tag, SESSION_ID)?,
                other => {
                    return Err(WireError::UnrecognizedField {
                        field: other.to_string(),
                    })
                }
            }
        }

        Ok(message)
    }
}

fn check_declared_len(bytes: &[u8], config: &CodecConfig) -> Result<(), WireError> {
    if let Some(prefix) = bytes.get(..4) {
        let declared = i32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]);
        if let Ok(len) = usize::try_from(declared) {
            if len > config.max_message_bytes {
                return Err(WireError::MessageTooLarge {
                    len,
                    limit: config.max_message_bytes,
                });
            }
        }
    }
    Ok(())
}
