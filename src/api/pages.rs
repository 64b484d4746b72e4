//! HTML page templates.

use chrono::NaiveDate;

use crate::data::TimeFeature;

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape(s: &str) -> String {
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

fn options(values: &[String], selected: bool) -> String {
    let attr = if selected { " selected" } else { "" };
    values
        .iter()
        .map(|v| {
            let v = escape(v);
            format!("<option value=\"{v}\"{attr}>{v}</option>")
        })
        .collect()
}

fn back_link(href: &str) -> String {
    format!("<a href=\"{href}\">⬅ Back</a>")
}

pub fn index() -> String {
    r#"<html>
    <head><title>Electricity Generation API</title></head>
    <body>
        <h2>Your API is up and running!</h2>
        <p>Available plotting endpoints:</p>
        <ul>
            <li><a href="/days_form">Plot by Days</a></li>
            <li><a href="/avg_form">Plot Average by Time Feature</a></li>
            <li><a href="/composition_form">Generation Composition Plot</a></li>
            <li><a href="/day_form">Plot a Single Day</a></li>
        </ul>
    </body>
</html>"#
        .to_string()
}

pub fn days_form(columns: &[String], max_days: i64) -> String {
    format!(
        r#"<html>
    <head><title>Plot by Days</title></head>
    <body>
        <h2>Plot by Days</h2>
        <form action="/plot" method="post">
            <label>Select columns (Ctrl+click for multiple):</label><br>
            <select name="columns" multiple size="10">{options}</select><br><br>

            <label>Number of days to plot:</label>
            <input type="number" name="days" value="{max_days}" min="1" max="{max_days}"><br><br>

            <label>Stacked:</label>
            <input type="checkbox" name="stacked"><br><br>

            <input type="submit" value="Plot">
        </form>
        {back}
    </body>
</html>"#,
        options = options(columns, false),
        back = back_link("/"),
    )
}

pub fn avg_form(columns: &[String]) -> String {
    let features: String = TimeFeature::ALL
        .iter()
        .map(|f| format!("<option value=\"{}\">{}</option>", f.name(), f.label()))
        .collect();
    format!(
        r#"<html>
    <head><title>Average by Time Feature</title></head>
    <body>
        <h2>Plot Average by Time Feature</h2>
        <form action="/avg_plot" method="post">
            <label>Select columns (Ctrl+click for multiple):</label><br>
            <select name="columns_avg" multiple size="10">{options}</select><br><br>

            <label>Time Feature:</label>
            <select name="time_feature">{features}</select><br><br>

            <label>Markers (optional, comma-separated: circle, triangle, square, cross):</label>
            <input type="text" name="markers"><br><br>

            <label>Colours (optional, comma-separated #RRGGBB):</label>
            <input type="text" name="colors"><br><br>

            <input type="submit" value="Plot Average">
        </form>
        {back}
    </body>
</html>"#,
        options = options(columns, false),
        back = back_link("/"),
    )
}

pub fn composition_form(generation_columns: &[String], default_days: i64, max_days: i64) -> String {
    format!(
        r#"<html>
    <head><title>Generation Composition</title></head>
    <body>
        <h2>Generation Composition Plot</h2>
        <form action="/composition_plot" method="post">
            <label>Select generation sources:</label><br>
            <select name="columns_comp" multiple size="12">{options}</select><br><br>

            <label>Number of days to plot:</label>
            <input type="number" name="days" value="{default_days}" min="1" max="{max_days}"><br><br>

            <input type="submit" value="Plot Composition">
        </form>
        {back}
    </body>
</html>"#,
        options = options(generation_columns, true),
        back = back_link("/"),
    )
}

pub fn day_form(columns: &[String], first: NaiveDate, last: NaiveDate) -> String {
    format!(
        r#"<html>
    <head><title>Plot a Single Day</title></head>
    <body>
        <h2>Plot a Single Day</h2>
        <form action="/day_plot" method="post">
            <label>Select columns (Ctrl+click for multiple):</label><br>
            <select name="columns_day" multiple size="10">{options}</select><br><br>

            <label>Day:</label>
            <input type="date" name="date" value="{last}" min="{first}" max="{last}"><br><br>

            <input type="submit" value="Plot Day">
        </form>
        {back}
    </body>
</html>"#,
        options = options(columns, false),
        back = back_link("/"),
    )
}

/// Chart page with a link back to the originating form.
pub fn chart(back: &str, title: &str, chart_html: &str) -> String {
    format!(
        "<html><head><title>{title}</title></head><body>{back}<br><br>{chart_html}</body></html>",
        title = escape(title),
        back = back_link(back),
    )
}

/// Informational page with a link back.
pub fn message(back: &str, text: &str) -> String {
    format!(
        "<html><body><h3>{text}</h3>{back}</body></html>",
        text = escape(text),
        back = back_link(back),
    )
}

pub fn error_page(text: &str) -> String {
    format!(
        "<html><head><title>Error</title></head><body><h3>Error</h3><p>{text}</p>{back}</body></html>",
        text = escape(text),
        back = back_link("/"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("a<b & \"c\"'"), "a&lt;b &amp; &quot;c&quot;&#39;");
    }

    #[test]
    fn composition_options_are_preselected() {
        let page = composition_form(&["generation_solar".to_string()], 10, 30);
        assert!(page.contains("<option value=\"generation_solar\" selected>generation_solar</option>"));
        assert!(page.contains("value=\"10\" min=\"1\" max=\"30\""));
    }

    #[test]
    fn avg_form_lists_title_cased_features() {
        let page = avg_form(&[]);
        assert!(page.contains("<option value=\"hour_of_day\">Hour Of Day</option>"));
        assert!(page.contains("<option value=\"month\">Month</option>"));
        assert!(page.contains("name=\"markers\""));
        assert!(page.contains("name=\"colors\""));
    }
}
