use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::Session;

pub struct TestConfig {
    pub api_base_url: String,
    pub socket_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            socket_url: "ws://localhost:5000".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            api_base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            api_base_url: self.api_base_url.clone(),
            socket_url: self.socket_url.clone(),
            session_file: PathBuf::from("session.json"),
            poll_interval_seconds: 30,
            request_timeout_seconds: 5,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub fn test_session(user_id: &str) -> Session {
    Session {
        user_id: user_id.to_string(),
        auth_token: format!("test-token-{}", Uuid::new_v4()),
    }
}

/// Canned backend payloads matching the wire contracts the services consume.
pub struct MockBackendResponses;

impl MockBackendResponses {
    pub fn login_response(user_id: &str) -> Value {
        json!({
            "token": format!("jwt-{}", Uuid::new_v4()),
            "id": user_id
        })
    }

    pub fn doctor_response(doctor_id: &str, name: &str) -> Value {
        json!({
            "id": doctor_id,
            "nama": name,
            "email": "dokter@example.com",
            "no_telp": "081234567890",
            "spesialis": "Umum",
            "foto": null
        })
    }

    pub fn appointment_response(
        id: &str,
        doctor_id: &str,
        patient_id: &str,
        tanggal: &str,
        status: &str,
    ) -> Value {
        json!({
            "id": id,
            "id_dokter": doctor_id,
            "id_masyarakat": patient_id,
            "nama_masyarakat": "Budi Santoso",
            "foto_masyarakat": null,
            "tanggal": tanggal,
            "jam": "09:00",
            "keluhan": "Demam dan batuk sejak dua hari",
            "status_konsul": status,
            "created_at": Utc::now().to_rfc3339()
        })
    }

    pub fn schedule_response(tanggal: &str, jam_mulai: &str, jam_selesai: &str) -> Value {
        json!({
            "tanggal": tanggal,
            "jam_mulai": jam_mulai,
            "jam_selesai": jam_selesai
        })
    }

    pub fn chat_message_response(
        sender: &str,
        sender_id: &str,
        receiver_id: &str,
        text: &str,
        waktu: &str,
    ) -> Value {
        json!({
            "id": Uuid::new_v4().to_string(),
            "text": text,
            "sender": sender,
            "senderId": sender_id,
            "receiverId": receiver_id,
            "type": "text",
            "waktu": waktu
        })
    }

    pub fn chat_list_entry(peer_id: &str, name: &str, last_message: &str, waktu: &str) -> Value {
        json!({
            "id": peer_id,
            "nama": name,
            "foto": null,
            "pesan_terakhir": last_message,
            "waktu_terakhir": waktu
        })
    }
}
