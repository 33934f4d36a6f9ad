//! Seam between the page-cutting logic and the PDF library
//!
//! The loader and extractor only ever talk to a [`DocumentEngine`]. The
//! production implementation is [`LopdfEngine`](crate::lopdf_engine::LopdfEngine);
//! tests substitute a fake that records the call sequence.

use crate::error::EngineError;
use crate::page_info::DocumentDetails;

pub trait DocumentEngine {
    /// A parsed source document
    type Source;
    /// A page copied out of a source, ready to be appended elsewhere
    type Page;
    /// A destination document under construction
    type Output;

    /// Parse raw bytes
    fn open(&self, bytes: &[u8]) -> Result<Self::Source, EngineError>;

    fn page_count(&self, source: &Self::Source) -> u32;

    /// Metadata and per-page geometry, read once at load time
    fn details(&self, source: &Self::Source) -> DocumentDetails;

    /// Create an empty destination document
    fn create(&self) -> Self::Output;

    /// Copy the zero-indexed `indices` out of `source`, in the given order
    fn copy_pages(
        &self,
        source: &Self::Source,
        indices: &[u32],
    ) -> Result<Vec<Self::Page>, EngineError>;

    /// Append a copied page at the end of `output`
    fn append_page(&self, output: &mut Self::Output, page: Self::Page) -> Result<(), EngineError>;

    /// Serialize `output` to PDF bytes
    fn serialize(&self, output: Self::Output) -> Result<Vec<u8>, EngineError>;
}
