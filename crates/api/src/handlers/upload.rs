//! `POST /chat/uploadImage` – Bild hochladen und als Nachricht verteilen

use axum::extract::{
    multipart::{Multipart, MultipartRejection},
    State,
};
use axum::response::Json;
use emporio_chat::{BildUpload, ChatNachricht};

use crate::error::{ApiFehler, ApiResult};
use crate::state::AppState;

/// Liest das Multipart-Formular, speichert das Bild und gibt die
/// erzeugte Nachricht zurueck
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ChatNachricht>> {
    let ergebnis = async {
        let upload = upload_lesen(multipart?).await?;
        Ok::<_, ApiFehler>(state.anhaenge.bild_hochladen(upload).await?)
    }
    .await;

    let label = match &ergebnis {
        Ok(_) => "ok",
        Err(e) if e.ist_serverfehler() => "fehler",
        Err(_) => "abgelehnt",
    };
    state.metriken.uploads_total.with_label_values(&[label]).inc();

    ergebnis.map(Json)
}

/// Sammelt die Formularfelder in einen [`BildUpload`]
///
/// Ein Textfeld `contentType` ueberschreibt den Content-Type des Datei-Parts.
async fn upload_lesen(mut multipart: Multipart) -> ApiResult<BildUpload> {
    let mut upload = BildUpload::default();
    let mut datei_gefunden = false;
    let mut content_type_feld: Option<String> = None;

    while let Some(feld) = multipart.next_field().await? {
        let name = feld.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                upload.dateiname = feld.file_name().map(str::to_string);
                upload.content_type = feld.content_type().map(str::to_string);
                upload.daten = feld.bytes().await?.to_vec();
                datei_gefunden = true;
            }
            "contentType" => content_type_feld = Some(feld.text().await?),
            "sender" => upload.sender = Some(feld.text().await?),
            "receiver" => upload.receiver = Some(feld.text().await?),
            _ => tracing::debug!(feld = %name, "Unbekanntes Formularfeld ignoriert"),
        }
    }

    if !datei_gefunden {
        return Err(ApiFehler::UngueltigeAnfrage(
            "Formularfeld 'file' fehlt".into(),
        ));
    }

    if let Some(typ) = content_type_feld.filter(|t| !t.trim().is_empty()) {
        upload.content_type = Some(typ);
    }

    Ok(upload)
}
