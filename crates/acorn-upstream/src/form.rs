//! Multipart encoding for claim submissions.

use acorn_core::claim::NewClaim;
use reqwest::{
  Body,
  multipart::{Form, Part},
};
use tokio_util::io::ReaderStream;

use crate::Result;

/// Build the `multipart/form-data` body for `POST .../claims`.
///
/// The invoice is streamed from its spool path with a known length, so the
/// upstream still sees a `Content-Length`. `cause_of_damage` is only attached
/// when present; the upstream treats it as optional.
pub(crate) async fn claim_form(claim: &NewClaim) -> Result<Form> {
  let file = tokio::fs::File::open(&claim.invoice.path).await?;
  let len = file.metadata().await?.len();
  let body = Body::wrap_stream(ReaderStream::new(file));
  let part = Part::stream_with_length(body, len).file_name(claim.invoice.file_name.clone());
  let part = match &claim.invoice.content_type {
    Some(content_type) => part.mime_str(content_type)?,
    None => part,
  };

  let mut form = Form::new()
    .part("invoice", part)
    .text("claim_date", claim.claim_date.clone())
    .text("damage_date", claim.damage_date.clone())
    .text("date_of_repair", claim.date_of_repair.clone());

  if let Some(cause) = &claim.cause_of_damage {
    form = form.text("cause_of_damage", cause.clone());
  }

  Ok(form)
}
