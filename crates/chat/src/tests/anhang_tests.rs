//! Unit-Tests fuer den AnhangService

use std::sync::Arc;

use super::AufzeichnendeZustellung;
use crate::{
    anhang::{AnhangService, MAX_BASISNAME_BYTES},
    error::ChatError,
    relay::MessageRelay,
    storage::DiskStorage,
    types::{BildUpload, NachrichtenTyp},
};

type TestService = AnhangService<DiskStorage, Arc<AufzeichnendeZustellung>>;

struct Aufbau {
    service: Arc<TestService>,
    zustellung: Arc<AufzeichnendeZustellung>,
    upload_dir: std::path::PathBuf,
    _dir: tempfile::TempDir,
}

fn aufbau_mit_limit(max_bytes: u64) -> Aufbau {
    let dir = tempfile::tempdir().expect("Temp-Verzeichnis konnte nicht erstellt werden");
    // Unterverzeichnis existiert noch nicht, wird beim ersten Upload angelegt
    let upload_dir = dir.path().join("uploads");
    let zustellung = Arc::new(AufzeichnendeZustellung::mit_usern(&["bob"]));
    let relay = MessageRelay::neu(zustellung.clone());
    let service = AnhangService::neu(
        Arc::new(DiskStorage::new(&upload_dir)),
        relay,
        max_bytes,
    );
    Aufbau {
        service,
        zustellung,
        upload_dir,
        _dir: dir,
    }
}

fn aufbau() -> Aufbau {
    aufbau_mit_limit(1024 * 1024)
}

fn jpeg_upload(name: &str, daten: &[u8]) -> BildUpload {
    BildUpload {
        dateiname: Some(name.to_string()),
        content_type: Some("image/jpeg".to_string()),
        sender: Some("alice".to_string()),
        receiver: Some("bob".to_string()),
        daten: daten.to_vec(),
    }
}

fn dateien_im_verzeichnis(dir: &std::path::Path) -> Vec<String> {
    match std::fs::read_dir(dir) {
        Ok(eintraege) => eintraege
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Prueft das Muster `<ziffern>_<name>` und gibt den Ziffernteil zurueck
fn praefix_pruefen<'a>(gespeichert: &'a str, name: &str) -> &'a str {
    let (ziffern, rest) = gespeichert
        .split_once('_')
        .expect("Gespeicherter Name ohne Unterstrich");
    assert!(!ziffern.is_empty() && ziffern.chars().all(|c| c.is_ascii_digit()), "{gespeichert}");
    assert_eq!(rest, name);
    ziffern
}

#[tokio::test]
async fn test_jpeg_hochladen_und_laden() {
    let a = aufbau();
    let inhalt: Vec<u8> = (0u8..=255).cycle().take(4096).collect();

    let nachricht = a
        .service
        .bild_hochladen(jpeg_upload("cat.jpg", &inhalt))
        .await
        .expect("Upload fehlgeschlagen");

    assert_eq!(nachricht.message_type, NachrichtenTyp::Image);
    assert_eq!(nachricht.sender.as_deref(), Some("alice"));
    assert_eq!(nachricht.receiver.as_deref(), Some("bob"));
    assert!(nachricht.content.is_empty());
    assert!(!nachricht.timestamp.is_empty());

    let url = nachricht.image_url.clone().expect("imageUrl fehlt");
    let gespeichert = url.strip_prefix("/images/").expect("URL-Praefix fehlt");
    praefix_pruefen(gespeichert, "cat.jpg");

    assert_eq!(dateien_im_verzeichnis(&a.upload_dir), vec![gespeichert.to_string()]);

    let bild = a.service.bild_laden(gespeichert).await.expect("Laden fehlgeschlagen");
    assert_eq!(bild.daten, inhalt);
    assert_eq!(bild.content_type, "image/jpeg");
    assert_eq!(bild.dateiname, gespeichert);
}

#[tokio::test]
async fn test_upload_wird_an_empfaenger_zugestellt() {
    let a = aufbau();

    let nachricht = a
        .service
        .bild_hochladen(jpeg_upload("cat.jpg", b"jpeg"))
        .await
        .unwrap();

    let adressiert = a.zustellung.adressiert.lock();
    assert_eq!(adressiert.len(), 1);
    assert_eq!(adressiert[0].0, "bob");
    assert_eq!(adressiert[0].1, nachricht);
    assert!(a.zustellung.broadcasts.lock().is_empty());
}

#[tokio::test]
async fn test_upload_ohne_empfaenger_ist_broadcast() {
    let a = aufbau();

    let mut upload = jpeg_upload("cat.png", b"png");
    upload.content_type = Some("image/png".into());
    upload.receiver = Some(String::new());
    upload.sender = None;

    let nachricht = a.service.bild_hochladen(upload).await.unwrap();

    assert_eq!(nachricht.receiver, None);
    assert_eq!(nachricht.sender, None);
    assert_eq!(a.zustellung.broadcasts.lock().len(), 1);
    assert!(a.zustellung.adressiert.lock().is_empty());
}

#[tokio::test]
async fn test_gif_wird_abgelehnt() {
    let a = aufbau();

    let mut upload = jpeg_upload("anim.gif", b"GIF89a");
    upload.content_type = Some("image/gif".into());

    let result = a.service.bild_hochladen(upload).await;
    assert!(matches!(result, Err(ChatError::UngueltigerDateityp(Some(ref t))) if t == "image/gif"));

    assert!(dateien_im_verzeichnis(&a.upload_dir).is_empty(), "Keine Datei erwartet");
    assert!(!a.upload_dir.exists(), "Verzeichnis darf nicht angelegt werden");
    assert!(a.zustellung.adressiert.lock().is_empty());
    assert!(a.zustellung.broadcasts.lock().is_empty());
}

#[tokio::test]
async fn test_fehlender_content_type_wird_abgelehnt() {
    let a = aufbau();

    let mut upload = jpeg_upload("cat.jpg", b"jpeg");
    upload.content_type = None;

    let result = a.service.bild_hochladen(upload).await;
    assert!(matches!(result, Err(ChatError::UngueltigerDateityp(None))));
    assert!(dateien_im_verzeichnis(&a.upload_dir).is_empty());
    assert!(a.zustellung.adressiert.lock().is_empty());
}

#[tokio::test]
async fn test_zu_grosse_datei_wird_abgelehnt() {
    let a = aufbau_mit_limit(16);

    let result = a
        .service
        .bild_hochladen(jpeg_upload("gross.jpg", &[0u8; 17]))
        .await;

    assert!(matches!(result, Err(ChatError::DateiZuGross { size: 17, max: 16 })));
    assert!(dateien_im_verzeichnis(&a.upload_dir).is_empty());
}

#[tokio::test]
async fn test_dateiname_mit_pfad_wird_bereinigt() {
    let a = aufbau();

    let nachricht = a
        .service
        .bild_hochladen(jpeg_upload("../../boese.jpg", b"x"))
        .await
        .unwrap();

    let url = nachricht.image_url.unwrap();
    praefix_pruefen(url.strip_prefix("/images/").unwrap(), "boese.jpg");
    assert_eq!(dateien_im_verzeichnis(&a.upload_dir).len(), 1);
}

#[tokio::test]
async fn test_ueberlanger_dateiname_wird_gekuerzt_gespeichert() {
    let a = aufbau();
    let original = format!("{}.jpg", "a".repeat(250));

    let nachricht = a
        .service
        .bild_hochladen(jpeg_upload(&original, b"x"))
        .await
        .expect("Ueberlanger Name darf kein IO-Fehler sein");

    let url = nachricht.image_url.unwrap();
    let gespeichert = url.strip_prefix("/images/").unwrap();
    let erwartet = format!("{}.jpg", "a".repeat(MAX_BASISNAME_BYTES - 4));
    praefix_pruefen(gespeichert, &erwartet);
    assert!(gespeichert.len() < 255);

    let bild = a.service.bild_laden(gespeichert).await.unwrap();
    assert_eq!(bild.daten, b"x");
}

#[tokio::test]
async fn test_pfadtraversal_beim_laden() {
    let a = aufbau();
    a.service.bild_hochladen(jpeg_upload("cat.jpg", b"x")).await.unwrap();

    // Datei ausserhalb des Upload-Verzeichnisses, aber im selben Temp-Ordner
    let geheim = a.upload_dir.parent().unwrap().join("geheim.txt");
    std::fs::write(&geheim, b"streng geheim").unwrap();

    for name in ["../geheim.txt", "..", "/etc/passwd", "..\\geheim.txt", "a/../../geheim.txt"] {
        let result = a.service.bild_laden(name).await;
        assert!(
            matches!(result, Err(ChatError::Pfadtraversal(_))),
            "{name} haette abgelehnt werden muessen"
        );
    }
}

#[tokio::test]
async fn test_nie_gespeicherte_datei_nicht_gefunden() {
    let a = aufbau();

    // Verzeichnis existiert noch nicht
    let result = a.service.bild_laden("123_gibtsnicht.jpg").await;
    assert!(matches!(result, Err(ChatError::NichtGefunden(_))));

    a.service.bild_hochladen(jpeg_upload("cat.jpg", b"x")).await.unwrap();
    let result = a.service.bild_laden("123_gibtsnicht.jpg").await;
    assert!(matches!(result, Err(ChatError::NichtGefunden(_))));
}

#[tokio::test]
async fn test_parallele_uploads_kollidieren_nicht() {
    let a = aufbau();

    let mut tasks = Vec::new();
    for i in 0..32u8 {
        let service = a.service.clone();
        tasks.push(tokio::spawn(async move {
            let inhalt = vec![i; 256 + i as usize];
            let nachricht = service
                .bild_hochladen(jpeg_upload(&format!("bild{i}.jpg"), &inhalt))
                .await
                .expect("Paralleler Upload fehlgeschlagen");
            (nachricht, inhalt)
        }));
    }

    let mut ergebnisse = Vec::new();
    for task in tasks {
        ergebnisse.push(task.await.unwrap());
    }

    assert_eq!(dateien_im_verzeichnis(&a.upload_dir).len(), 32);
    for (nachricht, inhalt) in ergebnisse {
        let url = nachricht.image_url.unwrap();
        let bild = a
            .service
            .bild_laden(url.strip_prefix("/images/").unwrap())
            .await
            .unwrap();
        assert_eq!(bild.daten, inhalt, "Inhalt von {url} beschaedigt");
    }
}

#[tokio::test]
async fn test_parallele_uploads_gleicher_name() {
    let a = aufbau();

    let mut tasks = Vec::new();
    for i in 0..16u8 {
        let service = a.service.clone();
        tasks.push(tokio::spawn(async move {
            service
                .bild_hochladen(jpeg_upload("cat.jpg", &[i; 64]))
                .await
        }));
    }

    let mut praefixe = Vec::new();
    for task in tasks {
        let nachricht = task.await.unwrap().expect("Upload fehlgeschlagen");
        let url = nachricht.image_url.unwrap();
        praefixe.push(praefix_pruefen(url.strip_prefix("/images/").unwrap(), "cat.jpg").to_string());
    }

    praefixe.sort();
    praefixe.dedup();
    assert_eq!(praefixe.len(), 16, "Zeitpraefixe muessen eindeutig sein");
    assert_eq!(dateien_im_verzeichnis(&a.upload_dir).len(), 16);
}
