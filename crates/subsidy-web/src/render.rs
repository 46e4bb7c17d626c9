//! Server-side HTML rendering.
//!
//! Pages are assembled from plain strings. Every value that originates from a
//! user or the store goes through [`escape`].

use subsidy_core::{RequestStatus, SubsidyRequest};

use crate::{ServerConfig, handlers::pages::SubmitForm};

/// Escape text for inclusion in HTML element content or quoted attributes.
pub fn escape(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      c => out.push(c),
    }
  }
  out
}

fn layout(config: &ServerConfig, title: &str, body: &str) -> String {
  format!(
    "<!DOCTYPE html>\n\
     <html lang=\"es\">\n\
     <head><meta charset=\"utf-8\"><title>{title} · {system}</title></head>\n\
     <body>\n\
     <nav><a href=\"/\">Inicio</a> | <a href=\"/solicitar\">Solicitar</a> | \
     <a href=\"/solicitudes\">Solicitudes</a> | <a href=\"/buscar\">Buscar</a> | \
     <a href=\"/about\">Acerca de</a></nav>\n\
     <h1>{title}</h1>\n\
     {body}\n\
     </body>\n\
     </html>\n",
    title = escape(title),
    system = escape(&config.system_name),
  )
}

// ─── Pages ───────────────────────────────────────────────────────────────────

pub fn index(config: &ServerConfig, registered: u64) -> String {
  let mut body = format!(
    "<p>{}</p>\n<h2>Subvenciones disponibles</h2>\n<ul>\n",
    escape(&config.description),
  );
  for offer in &config.subsidies {
    body.push_str(&format!(
      "<li>{} <small>({})</small></li>\n",
      escape(&offer.name),
      escape(&offer.bonus_type),
    ));
  }
  body.push_str("</ul>\n<h2>Estadísticas</h2>\n");
  body.push_str(&format!(
    "<p id=\"solicitantes_registrados\">Solicitantes registrados: {registered}</p>"
  ));
  layout(config, &config.system_name, &body)
}

pub fn submit_form(
  config: &ServerConfig,
  error: Option<&str>,
  previous: Option<&SubmitForm>,
) -> String {
  let mut body = String::new();
  if let Some(msg) = error {
    body.push_str(&format!(
      "<p class=\"error\" role=\"alert\">{}</p>\n",
      escape(msg),
    ));
  }

  let cedula     = previous.map(|p| p.cedula.as_str()).unwrap_or_default();
  let subvencion = previous.map(|p| p.subvencion.as_str()).unwrap_or_default();
  let tipo_bono  = previous
    .and_then(|p| p.tipo_bono.as_deref())
    .unwrap_or_default();

  let mut options = String::from("<option value=\"\">(ninguno)</option>");
  for offer in &config.subsidies {
    let selected = if offer.bonus_type == tipo_bono { " selected" } else { "" };
    options.push_str(&format!(
      "<option value=\"{v}\"{selected}>{v}</option>",
      v = escape(&offer.bonus_type),
    ));
  }

  body.push_str(&format!(
    "<form method=\"post\" action=\"/solicitar\">\n\
     <label>Cédula <input name=\"cedula\" maxlength=\"10\" value=\"{cedula}\" required></label>\n\
     <label>Subvención <input name=\"subvencion\" maxlength=\"50\" value=\"{subvencion}\" required></label>\n\
     <label>Tipo de bono <select name=\"tipo_bono\">{options}</select></label>\n\
     <button type=\"submit\">Enviar</button>\n\
     </form>",
    cedula = escape(cedula),
    subvencion = escape(subvencion),
  ));
  layout(config, "Solicitar subvención", &body)
}

pub fn success(config: &ServerConfig) -> String {
  layout(
    config,
    "Solicitud guardada",
    "<p>Solicitud guardada correctamente.</p>\n<a href=\"/\">Volver</a>",
  )
}

/// Table of requests. With `actions`, each row links to the status change
/// routes.
fn requests_table(requests: &[SubsidyRequest], actions: bool) -> String {
  if requests.is_empty() {
    return "<p class=\"empty\">No hay solicitudes.</p>".to_owned();
  }

  let mut out = String::from(
    "<table>\n<thead><tr><th>ID</th><th>Cédula</th><th>Subvención</th>\
     <th>Tipo de bono</th><th>Estado</th><th>Fecha</th>",
  );
  if actions {
    out.push_str("<th>Acciones</th>");
  }
  out.push_str("</tr></thead>\n<tbody>\n");

  for r in requests {
    out.push_str(&format!(
      "<tr><td>{id}</td><td>{cedula}</td><td>{subvencion}</td><td>{tipo}</td>\
       <td>{estado}</td><td>{fecha}</td>",
      id = r.id,
      cedula = escape(&r.identity_number),
      subvencion = escape(&r.subsidy_name),
      tipo = escape(r.bonus_type.as_deref().unwrap_or("-")),
      estado = escape(r.status.as_str()),
      fecha = r
        .submitted_at
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_owned()),
    ));
    if actions {
      out.push_str(&format!(
        "<td><a href=\"/estado/{id}/{ok}\">Aprobar</a> \
         <a href=\"/estado/{id}/{no}\">Rechazar</a></td>",
        id = r.id,
        ok = RequestStatus::Approved,
        no = RequestStatus::Rejected,
      ));
    }
    out.push_str("</tr>\n");
  }
  out.push_str("</tbody>\n</table>");
  out
}

pub fn request_list(config: &ServerConfig, requests: &[SubsidyRequest]) -> String {
  layout(config, "Solicitudes", &requests_table(requests, true))
}

/// Search form, followed by the results once a search has been made.
pub fn search(
  config: &ServerConfig,
  cedula: &str,
  results: Option<&[SubsidyRequest]>,
) -> String {
  let mut body = format!(
    "<form method=\"post\" action=\"/buscar\">\n\
     <label>Cédula <input name=\"cedula\" maxlength=\"10\" value=\"{}\"></label>\n\
     <button type=\"submit\">Buscar</button>\n\
     </form>\n",
    escape(cedula),
  );
  if let Some(results) = results {
    body.push_str(&requests_table(results, false));
  }
  layout(config, "Buscar solicitudes", &body)
}

pub fn about(config: &ServerConfig) -> String {
  let body = format!(
    "<p>{}</p>\n<p>Las solicitudes se registran en estado «{}» y un \
     administrador las aprueba o rechaza.</p>",
    escape(&config.description),
    RequestStatus::Pending,
  );
  layout(config, "Acerca de", &body)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn escape_covers_markup_characters() {
    assert_eq!(
      escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
      "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
    );
    assert_eq!(escape("Crédito"), "Crédito");
  }

  #[test]
  fn empty_table_renders_placeholder() {
    assert!(requests_table(&[], true).contains("No hay solicitudes"));
  }

  #[test]
  fn row_without_timestamp_renders_placeholder() {
    let row = SubsidyRequest {
      id:              1,
      identity_number: "0102030405".into(),
      subsidy_name:    "Bono Agrícola".into(),
      bonus_type:      None,
      status:          RequestStatus::Approved,
      submitted_at:    None,
    };
    let html = requests_table(&[row], false);
    assert!(html.contains("<td>Aprobado</td><td>-</td>"));
  }

  #[test]
  fn index_lists_configured_subsidies() {
    let config = ServerConfig::default();
    let html = index(&config, 3);
    assert!(html.contains("Bono Agrícola"));
    assert!(html.contains("Crédito Productivo"));
    assert!(html.contains("Solicitantes registrados: 3"));
  }
}
