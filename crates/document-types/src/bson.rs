//! Export to BSON for document stores.

use crate::document::{DocValue, Document};
use ::bson::spec::BinarySubtype;
use ::bson::{Binary, Bson, Decimal128};
use rust_decimal::Decimal;

/// Exponent bias of the IEEE 754-2008 decimal128 format.
const EXPONENT_BIAS: i32 = 6176;

impl From<DocValue> for Bson {
    fn from(value: DocValue) -> Self {
        match value {
            DocValue::Boolean(b) => Bson::Boolean(b),
            DocValue::Int32(i) => Bson::Int32(i),
            DocValue::Int64(i) => Bson::Int64(i),
            DocValue::Double(f) => Bson::Double(f),
            DocValue::String(s) => Bson::String(s),
            DocValue::Binary(bytes) => Bson::Binary(Binary {
                subtype: BinarySubtype::Generic,
                bytes,
            }),
            DocValue::Decimal(d) => Bson::Decimal128(to_decimal128(&d)),
            DocValue::Document(doc) => Bson::Document(doc.into()),
            DocValue::Array(arr) => Bson::Array(arr.into_iter().map(Bson::from).collect()),
        }
    }
}

impl From<Document> for ::bson::Document {
    fn from(doc: Document) -> Self {
        doc.into_iter()
            .map(|(name, value)| (name, Bson::from(value)))
            .collect()
    }
}

/// Encode a decimal as BID decimal128.
///
/// The 96-bit mantissa always fits the 113-bit coefficient field, and the scale (at most
/// 28) is well inside the exponent range, so the encoding is exact.
fn to_decimal128(d: &Decimal) -> Decimal128 {
    let mantissa = d.mantissa();
    let sign = u128::from(mantissa < 0);
    let exponent = (EXPONENT_BIAS - d.scale() as i32) as u128;
    let coefficient = mantissa.unsigned_abs();

    let bits = (sign << 127) | (exponent << 113) | coefficient;
    Decimal128::from_bytes(bits.to_le_bytes())
}
