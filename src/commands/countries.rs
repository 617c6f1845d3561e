use anyhow::Result;
use serde::Serialize;
use std::io::Write;

use crate::countries::CountryCatalog;
use crate::types::DocumentKind;

#[derive(Serialize)]
pub struct CountryRow<'a> {
    pub country: &'a str,
    pub country_code: &'a str,
    pub documents: Vec<DocumentKind>,
}

/// Catalog rows in display order, with the documents each country supports.
pub fn rows(catalog: &CountryCatalog) -> Vec<CountryRow<'_>> {
    catalog
        .entries()
        .iter()
        .map(|rec| CountryRow {
            country: &rec.country,
            country_code: &rec.country_code,
            documents: catalog.documents_for(&rec.country_code),
        })
        .collect()
}

pub fn emit<W: Write>(catalog: &CountryCatalog, mut out: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, &rows(catalog))?;
    writeln!(out)?;
    Ok(())
}
