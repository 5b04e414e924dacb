//! Bootstrap script rendering
//!
//! The script is the client half of the negotiation protocol. It is injected
//! into every response: as the whole body on the handshake path, and as a
//! prefix on the success path, where it acts as continuous drift detection
//! (DST transitions, travel between zones).
//!
//! Rendering is a pure function of the cookie name and the cookie attribute
//! suffix: the same inputs always produce byte-identical output. Both inputs
//! are validated at configuration time so the embedded tokens can never
//! contain script-breaking characters.

/// Script + noscript fragment, with `__NAME__` / `__ATTRS__` placeholders.
///
/// Behavior, per cookie state seen by the browser:
/// - absent: write the cookie with the negated `getTimezoneOffset()` value,
///   read it back, reload only if the write took effect; otherwise render a
///   visible remediation message instead of looping on reloads;
/// - stale (differs from the current browser offset): overwrite and reload;
/// - current: no action.
const TEMPLATE: &str = "\n<script>\n\
\t(function() {\n\
\t\tfunction readCookie(name) {\n\
\t\t\tconst parts = `; ${document.cookie}`.split(`; ${name}=`);\n\
\t\t\tif (parts.length >= 2) {\n\
\t\t\t\treturn parts.pop().split(';').shift();\n\
\t\t\t}\n\
\t\t}\n\
\t\tconst want = String(-(new Date()).getTimezoneOffset());\n\
\t\tconst have = readCookie('__NAME__');\n\
\t\tif (have === undefined) {\n\
\t\t\tdocument.cookie = `__NAME__=${want}__ATTRS__`;\n\
\t\t\tif (readCookie('__NAME__') === undefined) {\n\
\t\t\t\tdocument.write('<h1>Cookies are disabled</h1><p>This site needs cookies to show times in your timezone. Enable cookies and refresh the page.</p>');\n\
\t\t\t} else {\n\
\t\t\t\tlocation.reload();\n\
\t\t\t}\n\
\t\t} else if (have !== want) {\n\
\t\t\tdocument.cookie = `__NAME__=${want}__ATTRS__`;\n\
\t\t\tlocation.reload();\n\
\t\t}\n\
\t})();\n\
</script>\n\
<noscript><h1>JavaScript is required</h1><p>This site needs JavaScript to show times in your timezone. Enable it and refresh the page.</p></noscript>\n";

/// Render the bootstrap script for the given cookie name and attributes
///
/// `attributes` is the raw suffix appended to the `document.cookie`
/// assignment, e.g. `"; Path=/; Secure"`. Callers are expected to validate
/// both inputs first ([`is_cookie_token`], [`is_safe_attribute_suffix`]);
/// [`crate::TimezoneConfig`] does this at construction.
///
/// # Examples
///
/// ```
/// use tzgate::render_bootstrap_script;
///
/// let script = render_bootstrap_script("tzo", "; Path=/");
/// assert!(script.contains("getTimezoneOffset"));
/// assert!(script.contains("<noscript>"));
///
/// // Deterministic: same inputs, same bytes
/// assert_eq!(script, render_bootstrap_script("tzo", "; Path=/"));
/// ```
pub fn render_bootstrap_script(cookie_name: &str, attributes: &str) -> String {
	debug_assert!(is_cookie_token(cookie_name));
	debug_assert!(is_safe_attribute_suffix(attributes));

	TEMPLATE
		.replace("__NAME__", cookie_name)
		.replace("__ATTRS__", attributes)
}

/// Whether a string is a valid cookie name for this protocol
///
/// The name must be an RFC 6265 token (no controls, whitespace, or HTTP
/// separators) and must additionally avoid backtick, single quote, and `$`,
/// since the rendered name sits inside a single-quoted string and a JS
/// template literal.
///
/// # Examples
///
/// ```
/// use tzgate::is_cookie_token;
///
/// assert!(is_cookie_token("tzo"));
/// assert!(is_cookie_token("tz_sub_utc_minutes"));
/// assert!(!is_cookie_token(""));
/// assert!(!is_cookie_token("tz o"));
/// assert!(!is_cookie_token("tz;o"));
/// assert!(!is_cookie_token("tz`o"));
/// assert!(!is_cookie_token("tz'o"));
/// assert!(!is_cookie_token("tz$o"));
/// ```
pub fn is_cookie_token(name: &str) -> bool {
	const SEPARATORS: &[u8] = b"()<>@,;:\\\"/[]?={} \t";
	const SCRIPT_BREAKERS: &[u8] = b"`'$";

	!name.is_empty()
		&& name.bytes().all(|b| {
			(0x21..=0x7e).contains(&b) && !SEPARATORS.contains(&b) && !SCRIPT_BREAKERS.contains(&b)
		})
}

/// Whether a cookie attribute suffix is safe to embed in the script
///
/// Printable ASCII only, and nothing that could terminate the surrounding
/// template literal or script element.
pub fn is_safe_attribute_suffix(attributes: &str) -> bool {
	attributes
		.bytes()
		.all(|b| (0x20..=0x7e).contains(&b) && !b"`$\\'\"<>".contains(&b))
}
