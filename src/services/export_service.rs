use crate::error::{Error, Result};
use crate::models::certificate::{CertificateStatus, ExamCertificate};
use crate::utils::time;
use std::path::{Path, PathBuf};
use tracing::info;

/// Somewhere a finished certificate document can be shown or stored.
pub trait CertificateRenderer {
    fn present(&self, name: &str, html: &str) -> Result<()>;
}

/// Writes certificate documents as `<dir>/<name>.html`.
pub struct FileRenderer {
    dir: PathBuf,
}

impl FileRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        let stem: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.html", stem))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl CertificateRenderer for FileRenderer {
    fn present(&self, name: &str, html: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(name);
        std::fs::write(&path, html)?;
        info!(path = %path.display(), "Certificate written");
        Ok(())
    }
}

pub struct ExportService;

impl ExportService {
    /// Standalone printable certificate. Every interpolated value is escaped.
    pub fn certificate_html(cert: &ExamCertificate) -> Result<String> {
        if cert.status == CertificateStatus::Rejected {
            return Err(Error::InvalidState(format!(
                "Certificate {} was rejected and cannot be printed",
                cert.certificate_number
            )));
        }
        let esc = |s: &str| ammonia::clean_text(s);

        let holder = esc(cert.holder_name.as_deref().unwrap_or("Certificate Holder"));
        let title = esc(cert.exam_title.as_deref().unwrap_or("Homecare Competency Exam"));
        let number = esc(&cert.certificate_number);
        let issued = esc(&time::certificate_date(cert.issued_at));
        let score = cert
            .score
            .map(|s| format!("<p class=\"score\">Score: {}%</p>", s.round() as i64))
            .unwrap_or_default();
        let status = match cert.status {
            CertificateStatus::Approved => match cert.approved_at {
                Some(at) => format!("Approved {}", esc(&time::certificate_date(at))),
                None => "Approved".to_string(),
            },
            _ => "Pending approval".to_string(),
        };

        Ok(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Certificate {number}</title>
<style>
  body {{ font-family: Georgia, serif; margin: 0; padding: 48px; color: #1e293b; }}
  .frame {{ border: 8px double #0f766e; padding: 48px; text-align: center; }}
  h1 {{ font-size: 36px; margin-bottom: 8px; }}
  .holder {{ font-size: 28px; margin: 24px 0; }}
  .meta {{ font-size: 14px; color: #475569; }}
  @media print {{ body {{ padding: 0; }} }}
</style>
</head>
<body>
<div class="frame">
  <h1>Certificate of Completion</h1>
  <p>This certifies that</p>
  <p class="holder">{holder}</p>
  <p>has successfully completed</p>
  <h2>{title}</h2>
  {score}
  <p class="meta">Issued {issued} &middot; No. {number}</p>
  <p class="meta status">{status}</p>
</div>
</body>
</html>
"#
        ))
    }

    pub fn export(cert: &ExamCertificate, renderer: &dyn CertificateRenderer) -> Result<()> {
        let html = Self::certificate_html(cert)?;
        renderer.present(&cert.certificate_number, &html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn cert(status: CertificateStatus) -> ExamCertificate {
        ExamCertificate {
            id: "c1".into(),
            attempt_id: Some("a1".into()),
            exam_id: Some("e1".into()),
            user_id: Some("u1".into()),
            status,
            score: Some(92.0),
            certificate_number: "HC-2026/0007".into(),
            issued_at: time::from_rfc3339("2026-03-04T10:00:00Z").unwrap(),
            approved_at: None,
            approved_by_id: None,
            exam_title: Some("Infection Control".into()),
            holder_name: Some("<script>alert(1)</script> Kim".into()),
        }
    }

    struct Capture(RefCell<Vec<(String, String)>>);

    impl CertificateRenderer for Capture {
        fn present(&self, name: &str, html: &str) -> Result<()> {
            self.0.borrow_mut().push((name.to_string(), html.to_string()));
            Ok(())
        }
    }

    #[test]
    fn html_escapes_user_text() {
        let html = ExportService::certificate_html(&cert(CertificateStatus::Approved)).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("Infection Control"));
        assert!(html.contains("March 4, 2026"));
        assert!(html.contains("Score: 92%"));
    }

    #[test]
    fn pending_certificates_say_so() {
        let html = ExportService::certificate_html(&cert(CertificateStatus::Pending)).unwrap();
        assert!(html.contains("Pending approval"));
    }

    #[test]
    fn rejected_certificates_are_not_rendered() {
        let capture = Capture(RefCell::new(Vec::new()));
        let err = ExportService::export(&cert(CertificateStatus::Rejected), &capture).unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
        assert!(capture.0.borrow().is_empty());
    }

    #[test]
    fn export_hands_document_to_renderer() {
        let capture = Capture(RefCell::new(Vec::new()));
        ExportService::export(&cert(CertificateStatus::Approved), &capture).unwrap();
        assert_eq!(capture.0.borrow()[0].0, "HC-2026/0007");
    }

    #[test]
    fn file_renderer_writes_sanitized_name() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = FileRenderer::new(dir.path().join("certs"));
        ExportService::export(&cert(CertificateStatus::Approved), &renderer).unwrap();
        let path = renderer.path_for("HC-2026/0007");
        assert_eq!(path.file_name().unwrap(), "HC-2026_0007.html");
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.starts_with("<!DOCTYPE html>"));
    }
}
