//! Common test utilities for integration tests

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

/// A canned response served for an exact request path.
#[allow(dead_code)]
pub struct Route {
    pub path: &'static str,
    pub status: u16,
    pub body: Vec<u8>,
    pub delay: Duration,
}

#[allow(dead_code)]
impl Route {
    pub fn ok(path: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            path,
            status: 200,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    /// Same as [`Route::ok`], but the response is held back for `delay`.
    pub fn slow(path: &'static str, body: impl Into<Vec<u8>>, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::ok(path, body)
        }
    }

    pub fn status(path: &'static str, status: u16) -> Self {
        Self {
            path,
            status,
            body: b"error".to_vec(),
            delay: Duration::ZERO,
        }
    }
}

/// Starts a loopback HTTP/1.1 responder and returns its `http://host:port` origin.
///
/// Unknown paths get a 404. Every response closes the connection.
#[allow(dead_code)]
pub fn serve(routes: Vec<Route>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { break };
            respond(stream, &routes);
        }
    });

    format!("http://{addr}")
}

fn respond(mut stream: TcpStream, routes: &[Route]) {
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    // Drain headers up to the blank line
    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) if line == "\r\n" || line == "\n" => break,
            Ok(_) => {}
        }
    }

    let path = request_line.split_whitespace().nth(1).unwrap_or("/");
    let (status, body, delay) = routes
        .iter()
        .find(|route| route.path == path)
        .map(|route| (route.status, route.body.as_slice(), route.delay))
        .unwrap_or((404, b"not found".as_slice(), Duration::ZERO));
    thread::sleep(delay);
    let reason = if status == 200 { "OK" } else { "Error" };

    let head = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
    let _ = stream.flush();
}

/// Metadata document declaring a single resource.
#[allow(dead_code)]
pub fn metadata_json(title: &str, format: &str, url: &str, last_modified: &str) -> String {
    format!(
        r#"{{
  "title": "{title}",
  "organization": {{"name": "Direção-Geral do Território"}},
  "last_modified": "{last_modified}",
  "created_at": "2019-05-01T00:00:00",
  "frequency": "annual",
  "resources": [
    {{"format": "PDF", "url": "/files/notes.pdf"}},
    {{"format": "{format}", "url": "{url}"}}
  ]
}}"#
    )
}

/// Municipality CSV as the portal publishes it, with one code missing its leading zero.
#[allow(dead_code)]
pub const MUNICIPALITIES_CSV: &str = "designacao,dicofre\n\
Águeda,101\n\
Lisboa,1106\n\
Porto,1312\n\
,1313\n\
Sem Codigo,\n";

/// Parish CSV encoded in Latin-1 ("Sé" is `S\xe9`).
#[allow(dead_code)]
pub const PARISHES_CSV_LATIN1: &[u8] =
    b"freguesia,dicofre\nS\xe9,110601\nAgueda,10103\nBonfim,131202\n";

/// Builds a one-sheet `.xlsx` workbook in memory.
///
/// Cells that parse as numbers are stored as numeric cells, as spreadsheet tools do with
/// DICOFRE codes; everything else is an inline string. Empty cells are omitted.
#[allow(dead_code)]
pub fn xlsx_workbook(rows: &[&[&str]]) -> Vec<u8> {
    use std::io::Cursor;
    use zip::write::FileOptions;

    let mut sheet_rows = String::new();
    for (r, row) in rows.iter().enumerate() {
        sheet_rows.push_str(&format!("<row r=\"{}\">", r + 1));
        for (c, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let reference = format!("{}{}", (b'A' + c as u8) as char, r + 1);
            if value.parse::<f64>().is_ok() {
                sheet_rows.push_str(&format!("<c r=\"{reference}\"><v>{value}</v></c>"));
            } else {
                sheet_rows.push_str(&format!(
                    "<c r=\"{reference}\" t=\"inlineStr\"><is><t>{value}</t></is></c>"
                ));
            }
        }
        sheet_rows.push_str("</row>");
    }

    let parts = [
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#
                .to_string(),
        ),
        (
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
                .to_string(),
        ),
        (
            "xl/workbook.xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Concelhos" sheetId="1" r:id="rId1"/></sheets></workbook>"#
                .to_string(),
        ),
        (
            "xl/_rels/workbook.xml.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#
                .to_string(),
        ),
        (
            "xl/worksheets/sheet1.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{sheet_rows}</sheetData></worksheet>"#
            ),
        ),
    ];

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in parts {
        writer.start_file(name, FileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Municipality rows as the portal's workbook stores them: codes are numeric cells.
#[allow(dead_code)]
pub const MUNICIPALITIES_SHEET: &[&[&str]] = &[
    &["designacao", "dicofre"],
    &["Águeda", "106"],
    &["Lisboa", "1106"],
    &["Sem Codigo", ""],
];
