//! Receiving claim invoices.
//!
//! The multipart upload is streamed to a file under the upload directory,
//! owned by a [`SpooledInvoice`] guard. Dropping the guard removes the file,
//! so whatever happens to the upstream call nothing is left behind.

use std::{
  fmt,
  path::{Path, PathBuf},
};

use acorn_core::claim::{InvoiceFile, NewClaim};
use axum::extract::{
  Multipart,
  multipart::{Field, MultipartError, MultipartRejection},
};
use tokio::{fs::OpenOptions, io::AsyncWriteExt as _};

use crate::error::Error;

pub const FILE_CLAIM_FAILED: &str = "Error filing claim";

fn filing_failed(detail: impl fmt::Display) -> Error {
  Error::Invoice { message: FILE_CLAIM_FAILED, detail: detail.to_string() }
}

impl From<MultipartRejection> for Error {
  fn from(rejection: MultipartRejection) -> Self { filing_failed(rejection.body_text()) }
}

impl From<MultipartError> for Error {
  fn from(err: MultipartError) -> Self { filing_failed(err.body_text()) }
}

// ─── Guard ───────────────────────────────────────────────────────────────────

/// An invoice written to local disk. The file is deleted on drop.
#[derive(Debug)]
pub struct SpooledInvoice {
  path: PathBuf,
}

impl SpooledInvoice {
  pub fn path(&self) -> &Path { &self.path }
}

impl Drop for SpooledInvoice {
  fn drop(&mut self) {
    match std::fs::remove_file(&self.path) {
      Ok(()) => tracing::debug!(path = %self.path.display(), "removed spooled invoice"),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
      Err(e) => {
        tracing::warn!(path = %self.path.display(), error = %e, "failed to remove spooled invoice");
      }
    }
  }
}

/// Reduce a client-supplied file name to a safe final path component.
pub fn sanitize_file_name(name: &str) -> String {
  let last = name.rsplit(['/', '\\']).next().unwrap_or_default();
  let cleaned: String = last.chars().filter(|c| !c.is_control()).collect();
  match cleaned.trim() {
    "" | "." | ".." => "invoice".to_owned(),
    trimmed => trimmed.to_owned(),
  }
}

/// Create the spool file exclusively and hand back its guard.
async fn create_spool_file(
  dir: &Path,
  file_name: &str,
) -> std::io::Result<(tokio::fs::File, SpooledInvoice)> {
  let stamp = chrono::Utc::now().timestamp_millis();
  let mut path = dir.join(format!("{stamp}-{file_name}"));
  let mut opts = OpenOptions::new();
  opts.write(true).create_new(true);

  let first = opts.open(&path).await;
  let file = match first {
    Ok(file) => file,
    // Two uploads of the same name within one millisecond.
    Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
      path = dir.join(format!("{stamp}-{}-{file_name}", uuid::Uuid::new_v4()));
      opts.open(&path).await?
    }
    Err(e) => return Err(e),
  };
  Ok((file, SpooledInvoice { path }))
}

async fn spool_invoice(
  mut field: Field<'_>,
  dir: &Path,
) -> Result<(SpooledInvoice, InvoiceFile), Error> {
  let file_name = sanitize_file_name(field.file_name().unwrap_or_default());
  let content_type = field.content_type().map(str::to_owned);

  let (mut file, guard) =
    create_spool_file(dir, &file_name).await.map_err(filing_failed)?;

  let mut written = 0usize;
  while let Some(chunk) = field.chunk().await? {
    written += chunk.len();
    file.write_all(&chunk).await.map_err(filing_failed)?;
  }
  file.flush().await.map_err(filing_failed)?;

  tracing::debug!(path = %guard.path().display(), bytes = written, "spooled invoice");
  let invoice = InvoiceFile { path: guard.path().to_path_buf(), file_name, content_type };
  Ok((guard, invoice))
}

// ─── Claim form ──────────────────────────────────────────────────────────────

/// The fields of a claim-filing form, with the invoice already on disk.
#[derive(Debug, Default)]
pub struct ClaimForm {
  invoice:         Option<(SpooledInvoice, InvoiceFile)>,
  claim_date:      Option<String>,
  damage_date:     Option<String>,
  date_of_repair:  Option<String>,
  cause_of_damage: Option<String>,
}

impl ClaimForm {
  /// Read every part of `multipart`, spooling the `invoice` part into `dir`.
  ///
  /// Only the first `invoice` part is kept. Unknown parts are skipped.
  pub async fn read(mut multipart: Multipart, dir: &Path) -> Result<Self, Error> {
    let mut form = Self::default();
    while let Some(field) = multipart.next_field().await? {
      let Some(name) = field.name().map(str::to_owned) else { continue };
      match name.as_str() {
        "invoice" if form.invoice.is_none() => {
          form.invoice = Some(spool_invoice(field, dir).await?);
        }
        "claim_date" => form.claim_date = Some(field.text().await?),
        "damage_date" => form.damage_date = Some(field.text().await?),
        "date_of_repair" => form.date_of_repair = Some(field.text().await?),
        "cause_of_damage" => {
          let text = field.text().await?;
          form.cause_of_damage = (!text.trim().is_empty()).then_some(text);
        }
        _ => {}
      }
    }
    Ok(form)
  }

  /// Split into the file guard and the claim to relay.
  ///
  /// Missing dates are sent as empty strings; the upstream validates them.
  pub fn into_claim(self) -> Result<(SpooledInvoice, NewClaim), Error> {
    let (guard, invoice) =
      self.invoice.ok_or_else(|| filing_failed("invoice file is required"))?;
    let claim = NewClaim {
      invoice,
      claim_date: self.claim_date.unwrap_or_default(),
      damage_date: self.damage_date.unwrap_or_default(),
      date_of_repair: self.date_of_repair.unwrap_or_default(),
      cause_of_damage: self.cause_of_damage,
    };
    Ok((guard, claim))
  }
}
