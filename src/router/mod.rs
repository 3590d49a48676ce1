//! # Router de Archivos
//! src/router/mod.rs
//!
//! Traduce el request-target a una acción sobre el filesystem.
//!
//! ```text
//! target → decode → normalizar contra root → ¿dir? → ListDirectory
//!                                          → ¿extensión permitida? → ServeFile
//!                                          → NotFound
//! ```
//!
//! La lista de extensiones no es solo un lookup de MIME: es lo único que
//! decide qué archivos pueden salir del servidor. Un `.txt` que existe
//! responde 404 igual que uno que no existe.

use crate::http::request::decode_path;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Extensiones servibles y su Content-Type
pub const ALLOWED_MIME: &[(&str, &str)] = &[
    ("html", "text/html; charset=utf-8"),
    ("png", "image/png"),
    ("pdf", "application/pdf"),
];

/// Caracteres que se escapan en un path de URL
const PATH_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'\'')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'\\');

/// Un nombre de entrada es un solo segmento: también se escapa '/'
const HREF_ESCAPE: &AsciiSet = &PATH_ESCAPE.add(b'/');

/// Por qué un target no se sirve (todas son 404 para el cliente)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Miss {
    /// No existe dentro del root
    Missing,
    /// El path resuelto escapa del root (`..`, symlinks)
    OutsideRoot,
    /// Existe pero su extensión no está permitida
    UnsupportedExtension,
}

/// Decisión del router para un target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    ServeFile { path: PathBuf, mime: &'static str },
    ListDirectory { path: PathBuf },
    NotFound(Miss),
}

/// Content-Type de un archivo permitido, `None` si su extensión no lo está
///
/// ```
/// use http_fileserver::router::mime_for;
/// use std::path::Path;
///
/// assert_eq!(mime_for(Path::new("a/b.PNG")), Some("image/png"));
/// assert_eq!(mime_for(Path::new("notes.txt")), None);
/// ```
pub fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    ALLOWED_MIME
        .iter()
        .find(|(allowed, _)| *allowed == ext)
        .map(|(_, mime)| *mime)
}

/// Une un path ya decodificado con el root sin salir de él
///
/// Normaliza `.` y `..` de forma léxica antes de tocar el disco: un `..`
/// que subiría por encima del root devuelve `None`. Si el resultado existe,
/// además se canonicaliza para que un symlink no apunte fuera del root.
/// `root` debe estar canonicalizado.
pub fn safe_join(root: &Path, decoded: &str) -> Option<PathBuf> {
    let mut rel = PathBuf::new();

    for component in Path::new(decoded.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => rel.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !rel.pop() {
                    return None;
                }
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    let full = root.join(rel);
    match full.canonicalize() {
        Ok(real) if real.starts_with(root) => Some(real),
        Ok(_) => None,
        // No existe (o no se puede resolver): el caller lo verá como 404
        Err(_) => Some(full),
    }
}

/// Decide qué hacer con un request-target crudo
pub fn route(target: &str, root: &Path) -> RouteDecision {
    let root = match root.canonicalize() {
        Ok(root) => root,
        Err(_) => return RouteDecision::NotFound(Miss::Missing),
    };

    let decoded = decode_path(target);
    let path = match safe_join(&root, &decoded) {
        Some(path) => path,
        None => return RouteDecision::NotFound(Miss::OutsideRoot),
    };

    let metadata = match fs::metadata(&path) {
        Ok(metadata) => metadata,
        Err(_) => return RouteDecision::NotFound(Miss::Missing),
    };

    if metadata.is_dir() {
        return RouteDecision::ListDirectory { path };
    }

    match mime_for(&path) {
        Some(mime) => RouteDecision::ServeFile { path, mime },
        None => RouteDecision::NotFound(Miss::UnsupportedExtension),
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Nombres de las entradas inmediatas de `dir`, en orden lexicográfico
pub fn sorted_entries(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<io::Result<Vec<_>>>()?;
    names.sort();
    Ok(names)
}

fn listing_row(dir: &Path, name: &str) -> String {
    let href = utf8_percent_encode(name, HREF_ESCAPE);

    // fs::metadata sigue symlinks; si están rotos mostramos la fila igual
    let (mtime, size) = match fs::metadata(dir.join(name)) {
        Ok(meta) => {
            let mtime = meta
                .modified()
                .map(httpdate::fmt_http_date)
                .unwrap_or_default();
            let size = if meta.is_dir() {
                "-".to_string()
            } else {
                format!("{} B", meta.len())
            };
            (mtime, size)
        }
        Err(_) => (String::new(), "-".to_string()),
    };

    format!(
        "<tr><td><a href=\"{}/\">{}</a></td><td>{}</td><td>{}</td></tr>\n",
        href,
        escape_html(name),
        mtime,
        size
    )
}

/// Genera la página HTML con el listado de `dir`
///
/// `request_path` es el path decodificado que pidió el cliente y solo se usa
/// para el título. Cada entrada enlaza a `nombre/`.
pub fn render_listing(dir: &Path, request_path: &str) -> io::Result<String> {
    let rows: String = match sorted_entries(dir) {
        Ok(names) => names.iter().map(|name| listing_row(dir, name)).collect(),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            "<tr><td colspan=3>Permission denied</td></tr>\n".to_string()
        }
        Err(e) => return Err(e),
    };

    let mut req_path = request_path.to_string();
    if !req_path.ends_with('/') {
        req_path.push('/');
    }
    let parent = if req_path == "/" { "/" } else { "../" };
    let title = format!("Index of {}", escape_html(&req_path));
    // Los links son relativos; <base> los ancla aunque falte la '/' final
    let base = utf8_percent_encode(&req_path, PATH_ESCAPE);

    Ok(format!(
        "<!doctype html>\n\
         <meta charset=\"utf-8\"><base href=\"{base}\"><title>{title}</title>\n\
         <h1>{title}</h1>\n\
         <table border=\"1\" cellpadding=\"6\" cellspacing=\"0\">\n\
         <tr><th>Name</th><th>Last Modified</th><th>Size</th></tr>\n\
         <tr><td><a href=\"{parent}\">Parent Directory</a></td><td></td><td></td></tr>\n\
         {rows}</table>\n"
    ))
}

/// `Last-Modified` de un archivo, si el filesystem lo reporta
pub fn last_modified(path: &Path) -> Option<String> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(httpdate::fmt_http_date)
}
