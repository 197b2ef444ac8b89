use clap::Subcommand;
use std::path::PathBuf;
use uuid::Uuid;

use crate::cli::{utils, Shell};
use crate::forms::document_upload::DOCUMENT_UPLOADED;
use crate::forms::{DocumentUploadForm, FileAttachment, FormController, SubmitOutcome};
use crate::guard::Route;
use crate::models::DocumentType;

#[derive(Subcommand)]
pub enum DocumentCommands {
    #[command(about = "List document types and their accepted formats")]
    Types,

    #[command(about = "List uploaded documents")]
    List,

    #[command(about = "Upload a file as a document of the given type")]
    Upload {
        #[arg(help = "Path of the file to upload")]
        file: PathBuf,
        #[arg(long = "type", help = "Document type name or id")]
        doc_type: String,
        #[arg(long, help = "Case the document belongs to")]
        case: Option<Uuid>,
        #[arg(long, default_value = "")]
        notes: String,
    },
}

fn find_type(types: Vec<DocumentType>, wanted: &str) -> Option<DocumentType> {
    let wanted_id = Uuid::parse_str(wanted).ok();
    types.into_iter().find(|t| {
        (wanted_id.is_some() && t.id == wanted_id) || t.name.eq_ignore_ascii_case(wanted.trim())
    })
}

pub async fn handle(cmd: DocumentCommands, shell: &Shell) -> anyhow::Result<()> {
    match cmd {
        DocumentCommands::Types => {
            shell.enter(Route::Documents).await?;
            let types = shell.services.document_types.get_all().await?;
            utils::output_list(&shell.format, "document_types", &types, "No document types", |t| {
                format!(
                    "{:<28}{:<14}{}{}",
                    t.name,
                    t.category,
                    t.allowed_formats(),
                    if t.required { "  (required)" } else { "" }
                )
            })
        }
        DocumentCommands::List => {
            shell.enter(Route::Documents).await?;
            let documents = shell.services.documents.get_all().await?;
            utils::output_list(&shell.format, "documents", &documents, "No documents uploaded", |d| {
                format!("{:<32}{:>10} bytes  {}", d.file_name, d.file_size, d.file_path)
            })
        }
        DocumentCommands::Upload {
            file,
            doc_type,
            case,
            notes,
        } => {
            let state = shell.enter(Route::Documents).await?;
            let user_id = state
                .user
                .as_ref()
                .map(|u| u.id)
                .ok_or_else(|| anyhow::anyhow!("Not signed in"))?;

            let types = shell.services.document_types.get_all().await?;
            let document_type = find_type(types, &doc_type)
                .ok_or_else(|| anyhow::anyhow!("Unknown document type '{}'", doc_type))?;
            let attachment = FileAttachment::from_path(&file)
                .await
                .map_err(|e| anyhow::anyhow!("Cannot read {}: {}", file.display(), e))?;

            let mut form = FormController::new(
                DocumentUploadForm::new(shell.config.uploads.max_file_bytes),
                shell.notifier(),
            );
            {
                let values = form.values_mut();
                values.document_type = Some(document_type);
                values.case_id = case;
                values.file = Some(attachment);
                values.notes = notes;
            }

            let uploads = shell.services.uploads.clone();
            let outcome = form
                .submit(DOCUMENT_UPLOADED, |values| async move { uploads.upload(user_id, values).await })
                .await;

            match outcome {
                SubmitOutcome::Submitted(document) => utils::output_success(
                    &shell.format,
                    &format!("Uploaded {}", document.file_name),
                    Some(serde_json::json!({ "document": document })),
                ),
                SubmitOutcome::Invalid(errors) => {
                    utils::output_field_errors(&shell.format, &errors)?;
                    Err(anyhow::anyhow!("Upload rejected"))
                }
                SubmitOutcome::Failed(e) => Err(anyhow::anyhow!(e.user_message())),
            }
        }
    }
}
