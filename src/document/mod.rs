/*!
 * DOCX document handling.
 *
 * This module owns everything between raw DOCX bytes and the
 * paragraph/run model the translation engine works on:
 *
 * - `package`: OPC zip reading/writing with faithful entry metadata
 * - `xml`: lossless event-stream parse/serialize of XML parts
 * - `model`: `Document`, `Paragraph`, `Run` and their formatting types
 * - `loader`: byte stream to model
 * - `serializer`: mutated model back to a byte stream
 */

pub mod loader;
pub mod model;
pub mod package;
pub mod serializer;
pub mod xml;

pub use loader::load_document;
pub use model::{Document, Paragraph, Run, RunProperties};
pub use serializer::serialize_document;
