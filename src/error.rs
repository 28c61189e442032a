use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::{Display, Error};
use serde_json::json;
use strum_macros::IntoStaticStr;

/// Every failure surfaced to the client. `Display` is the user-facing message the app
/// shows in its alert; the strum name is the stable machine code.
#[derive(Debug, Display, Error, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum AppError {
    // permission
    #[display(fmt = "Lokasi belum didapatkan. Silakan tunggu sebentar.")]
    LocationUnavailable,
    #[display(fmt = "Lokasi sudah kedaluwarsa. Silakan ambil ulang lokasi Anda.")]
    StaleLocation,
    #[display(fmt = "Koordinat lokasi tidak valid.")]
    InvalidCoordinates,
    #[display(fmt = "Anda tidak memiliki akses ke halaman ini.")]
    Forbidden,
    #[display(fmt = "Tidak memiliki izin untuk menulis data.")]
    WritePermissionDenied,

    // not found
    #[display(fmt = "Employee ID tidak ditemukan. Pastikan data user sudah lengkap di database.")]
    NoEmployeeProfile,
    #[display(fmt = "Data user tidak ditemukan.")]
    ProfileNotFound,
    #[display(fmt = "Anda belum melakukan check in hari ini")]
    NotCheckedIn,
    #[display(fmt = "Data absensi hari ini tidak ditemukan.")]
    RecordNotFound,

    // lifecycle
    #[display(fmt = "Anda sudah melakukan check in hari ini")]
    AlreadyCheckedIn,
    #[display(fmt = "Anda sudah melakukan check out hari ini")]
    AlreadyCheckedOut,

    // auth
    #[display(fmt = "Format email tidak valid.")]
    InvalidEmail,
    #[display(fmt = "User tidak ditemukan. Pastikan email sudah terdaftar.")]
    UnknownUser,
    #[display(fmt = "Password salah.")]
    WrongPassword,
    #[display(fmt = "Sesi tidak valid atau sudah berakhir. Silakan login kembali.")]
    InvalidToken,

    // transport
    #[display(fmt = "Gagal memproses permintaan. Periksa koneksi Anda.")]
    Store { detail: String },
    #[display(fmt = "Terjadi kesalahan pada server.")]
    Internal { detail: String },
}

impl AppError {
    pub fn code(&self) -> &'static str {
        self.into()
    }

    pub fn store(detail: impl std::fmt::Display) -> Self {
        AppError::Store {
            detail: detail.to_string(),
        }
    }

    pub fn internal(detail: impl std::fmt::Display) -> Self {
        AppError::Internal {
            detail: detail.to_string(),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!(error = %e, "Database error");
        AppError::store(e)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::LocationUnavailable
            | AppError::StaleLocation
            | AppError::InvalidCoordinates
            | AppError::InvalidEmail => StatusCode::BAD_REQUEST,
            AppError::UnknownUser | AppError::WrongPassword | AppError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden | AppError::WritePermissionDenied | AppError::NoEmployeeProfile => {
                StatusCode::FORBIDDEN
            }
            AppError::ProfileNotFound | AppError::NotCheckedIn | AppError::RecordNotFound => {
                StatusCode::NOT_FOUND
            }
            AppError::AlreadyCheckedIn | AppError::AlreadyCheckedOut => StatusCode::CONFLICT,
            AppError::Store { .. } | AppError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.code(),
            "message": self.to_string(),
        }))
    }
}
