//! HTML for the two pages. Small enough to live inline.

use pixelart::BlockSize;

pub fn index() -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
  <meta charset="utf-8">
  <title>Pixel Art</title>
</head>
<body>
  <h1>Conversor de Pixel Art</h1>
  <form method="post" action="/" enctype="multipart/form-data">
    <p><input type="file" name="file" accept="image/*" required></p>
    <p>
      <label for="tamanho_pixel">Tamanho do pixel</label>
      <input type="number" id="tamanho_pixel" name="tamanho_pixel" min="1" value="{default}">
    </p>
    <p><button type="submit">Converter</button></p>
  </form>
</body>
</html>
"#,
        default = BlockSize::DEFAULT,
    )
}

pub fn result(filename: &str) -> String {
    let name = escape_html(filename);
    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
  <meta charset="utf-8">
  <title>Pixel Art - {name}</title>
</head>
<body>
  <h1>Resultado</h1>
  <p><img src="/preview/{name}" alt="{name}"></p>
  <p><a href="/download/{name}">Baixar imagem</a></p>
  <p><a href="/">Converter outra imagem</a></p>
</body>
</html>
"#
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_has_both_fields() {
        let html = index();
        assert!(html.contains(r#"name="file""#));
        assert!(html.contains(r#"name="tamanho_pixel""#));
        assert!(html.contains(r#"value="10""#));
        assert!(html.contains("multipart/form-data"));
    }

    #[test]
    fn result_links_preview_and_download() {
        let html = result("cat_pixelart.png");
        assert!(html.contains(r#"src="/preview/cat_pixelart.png""#));
        assert!(html.contains(r#"href="/download/cat_pixelart.png""#));
    }

    #[test]
    fn result_escapes_name() {
        let html = result(r#"<script>"x"&'y'"#);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;&quot;x&quot;&amp;&#x27;y&#x27;"));
    }
}
