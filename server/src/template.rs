use std::collections::BTreeMap;

/// Resource that answers POST requests with a table of the submitted
/// parameters.
pub const PARAMS_TEMPLATE: &str = "params_info.html";

const BODY_CLOSE: &str = "</body>";

/// Copies the template lines through, inserting the parameter table right
/// before the first line that contains `</body>`. Each line is terminated
/// with `\n`.
pub fn render_params(lines: &[String], params: &BTreeMap<String, String>) -> String {
    let mut html = String::new();
    let mut injected = false;

    for line in lines {
        if !injected && line.contains(BODY_CLOSE) {
            html.push_str(&params_table(params));
            injected = true;
        }
        html.push_str(line);
        html.push('\n');
    }

    html
}

fn params_table(params: &BTreeMap<String, String>) -> String {
    let mut table = String::from(
        "<table border=\"1\">\n<tr>\n<th>Parameter Name</th>\n<th>Parameter Value</th>\n</tr>\n",
    );
    for (key, value) in params {
        table.push_str(&format!("<tr><td>{key}</td><td>{value}</td></tr>\n"));
    }
    table.push_str("</table>\n");
    table
}
