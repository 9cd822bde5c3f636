//! Flavor colors and icons.

/// An sRGB color with 8-bit channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
	pub r: u8,
	pub g: u8,
	pub b: u8,
}

impl Rgb {
	pub const fn new(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b }
	}

	pub fn css(&self) -> String {
		format!("rgb({}, {}, {})", self.r, self.g, self.b)
	}
}

/// Returned by [`mix_colors`] when no tag has a color.
pub const NEUTRAL: Rgb = Rgb::new(200, 200, 200);
pub const DEFAULT_ICON: &str = "🌿";

// Hues spread as far apart as the set allows.
const BASE_FLAVORS: &[(&str, Rgb, &str)] = &[
	("Orange", Rgb::new(255, 140, 0), "🍊"),
	("Citrus", Rgb::new(255, 255, 0), "🍋"),
	("Tangerine", Rgb::new(255, 85, 0), "🍊"),
	("Mango", Rgb::new(255, 200, 0), "🥭"),
	("Lemon", Rgb::new(200, 255, 0), "🍋"),
	("Sweet", Rgb::new(255, 0, 128), "🍯"),
	("Skunk", Rgb::new(128, 255, 0), "💨"),
	("Earthy", Rgb::new(128, 64, 0), "🌍"),
	("Pungent", Rgb::new(255, 0, 255), "👃"),
	("Pine", Rgb::new(0, 200, 100), "🌲"),
	("Spicy", Rgb::new(255, 0, 0), "🌶️"),
	("Grape", Rgb::new(128, 0, 255), "🍇"),
	("Berry", Rgb::new(200, 0, 100), "🫐"),
	("Punch", Rgb::new(255, 0, 64), "👊"),
	("Fresh", Rgb::new(0, 255, 128), "💨"),
	("Diesel", Rgb::new(0, 128, 255), "⛽"),
	("Chemical", Rgb::new(0, 255, 255), "⚗️"),
	("Fruity", Rgb::new(255, 64, 200), "🍓"),
];

fn lookup(tag: &str) -> Option<&'static (&'static str, Rgb, &'static str)> {
	BASE_FLAVORS.iter().find(|(name, _, _)| *name == tag)
}

pub fn tag_to_color(tag: &str) -> Option<Rgb> {
	lookup(tag).map(|(_, rgb, _)| *rgb)
}

pub fn tag_to_icon(tag: &str) -> &'static str {
	lookup(tag).map_or(DEFAULT_ICON, |(_, _, icon)| *icon)
}

/// Channel-wise rounded average of every tag that has a color.
pub fn mix_colors<S: AsRef<str>>(tags: &[S]) -> Rgb {
	let resolved: Vec<Rgb> = tags.iter().filter_map(|t| tag_to_color(t.as_ref())).collect();
	if resolved.is_empty() {
		return NEUTRAL;
	}
	let n = resolved.len() as f64;
	let avg = |channel: fn(&Rgb) -> u8| -> u8 {
		let sum: f64 = resolved.iter().map(|c| channel(c) as f64).sum();
		(sum / n).round() as u8
	};
	Rgb::new(avg(|c| c.r), avg(|c| c.g), avg(|c| c.b))
}

/// Short label for a flavor blend, e.g. `Orange-Citrus-Sweet`.
pub fn mixed_flavor_name<S: AsRef<str>>(tags: &[S]) -> String {
	match tags {
		[] => "Neutral".to_owned(),
		[one] => one.as_ref().to_owned(),
		_ => tags
			.iter()
			.take(3)
			.map(AsRef::as_ref)
			.collect::<Vec<_>>()
			.join("-"),
	}
}

/// Every base flavor with its color and icon, in legend order.
pub fn legend_entries() -> impl Iterator<Item = (&'static str, Rgb, &'static str)> {
	BASE_FLAVORS.iter().copied()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn known_and_unknown_tags() {
		assert_eq!(tag_to_color("Diesel"), Some(Rgb::new(0, 128, 255)));
		assert_eq!(tag_to_color("diesel"), None);
		assert_eq!(tag_to_icon("Grape"), "🍇");
		assert_eq!(tag_to_icon("Nutty"), DEFAULT_ICON);
	}

	#[test]
	fn mix_averages_resolved_tags_only() {
		let mixed = mix_colors(&["Orange", "Diesel", "Unknown"]);
		assert_eq!(mixed, Rgb::new(128, 134, 128));
		assert_eq!(mix_colors::<&str>(&[]), NEUTRAL);
		assert_eq!(mix_colors(&["Nope"]), NEUTRAL);
	}

	#[test]
	fn css_strings() {
		assert_eq!(Rgb::new(1, 2, 3).css(), "rgb(1, 2, 3)");
		assert_eq!(NEUTRAL.css(), "rgb(200, 200, 200)");
	}

	#[test]
	fn blend_names() {
		assert_eq!(mixed_flavor_name::<&str>(&[]), "Neutral");
		assert_eq!(mixed_flavor_name(&["Pine"]), "Pine");
		assert_eq!(mixed_flavor_name(&["Pine", "Earthy"]), "Pine-Earthy");
		assert_eq!(
			mixed_flavor_name(&["Pine", "Earthy", "Sweet", "Berry"]),
			"Pine-Earthy-Sweet"
		);
	}

	#[test]
	fn legend_lists_every_flavor() {
		assert_eq!(legend_entries().count(), 18);
		assert_eq!(legend_entries().next().map(|e| e.0), Some("Orange"));
	}
}
