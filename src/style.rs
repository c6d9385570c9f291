// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Galene-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Galene and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Presentation rules for nodes and relations.
//!
//! These are pure functions of the entity state so that restyling after a relation-mode change is
//! a single deterministic step.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::RelationModeType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub normal_relation: String,
    pub faint_relation: String,
    pub visual_relation: String,
    pub faint_opacity: f32,
    pub light_label: String,
    pub dark_label: String,
    pub node_fill: String,
    pub node_border: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            normal_relation: "#3d4852".to_owned(),
            faint_relation: "#b8c2cc".to_owned(),
            visual_relation: "#e3342f".to_owned(),
            faint_opacity: 0.35,
            light_label: "#ffffff".to_owned(),
            dark_label: "#1f2933".to_owned(),
            node_fill: "#dae1e7".to_owned(),
            node_border: "#606f7b".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeStyle {
    pub fill: String,
    pub stroke: String,
    pub label_fill: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelationStyle {
    pub stroke: String,
    pub opacity: f32,
    pub dashed: bool,
    pub label_fill: String,
}

/// Interaction affordances a renderer exposes on a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkTools {
    pub vertices: bool,
    pub endpoint_drag: bool,
    pub remove: bool,
}

/// Visual relations are user-editable and removable; the others only allow bend editing.
pub fn relation_tools(mode: RelationModeType) -> LinkTools {
    match mode {
        RelationModeType::Visual => LinkTools {
            vertices: true,
            endpoint_drag: true,
            remove: true,
        },
        RelationModeType::Normal | RelationModeType::Faint => LinkTools {
            vertices: true,
            endpoint_drag: false,
            remove: false,
        },
    }
}

pub fn relation_style(mode: RelationModeType, palette: &Palette) -> RelationStyle {
    match mode {
        RelationModeType::Normal => RelationStyle {
            stroke: palette.normal_relation.clone(),
            opacity: 1.0,
            dashed: false,
            label_fill: palette.normal_relation.clone(),
        },
        RelationModeType::Faint => RelationStyle {
            stroke: palette.faint_relation.clone(),
            opacity: palette.faint_opacity,
            dashed: true,
            label_fill: palette.faint_relation.clone(),
        },
        RelationModeType::Visual => RelationStyle {
            stroke: palette.visual_relation.clone(),
            opacity: 1.0,
            dashed: false,
            label_fill: palette.visual_relation.clone(),
        },
    }
}

/// Body fill/stroke from the node colors; the label color is picked for contrast against the
/// fill unless `label_override` is given.
pub fn node_style(
    color: &str,
    border_color: &str,
    palette: &Palette,
    luminance_threshold: f64,
    label_override: Option<&str>,
) -> NodeStyle {
    let label_fill = match label_override {
        Some(label) => label.to_owned(),
        None if is_dark(color, luminance_threshold) => palette.light_label.clone(),
        None => palette.dark_label.clone(),
    };
    NodeStyle {
        fill: color.to_owned(),
        stroke: border_color.to_owned(),
        label_fill,
    }
}

/// Parses `#rgb` / `#rrggbb` colors (the `#` is optional).
pub fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    static HEX: OnceLock<Option<Regex>> = OnceLock::new();
    let re = HEX
        .get_or_init(|| Regex::new(r"^#?([0-9a-fA-F]{6}|[0-9a-fA-F]{3})$").ok())
        .as_ref()?;
    let digits = re.captures(color.trim())?.get(1)?.as_str();

    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    if digits.len() == 3 {
        let expand = |c: &str| channel(&c.repeat(2));
        Some((
            expand(&digits[0..1])?,
            expand(&digits[1..2])?,
            expand(&digits[2..3])?,
        ))
    } else {
        Some((
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
        ))
    }
}

/// Perceived brightness in `0.0..=255.0` (ITU-R BT.601 weights).
pub fn perceived_brightness(r: u8, g: u8, b: u8) -> f64 {
    (f64::from(r) * 299.0 + f64::from(g) * 587.0 + f64::from(b) * 114.0) / 1000.0
}

/// Unparseable colors count as light.
pub fn is_dark(color: &str, threshold: f64) -> bool {
    parse_hex_color(color)
        .map(|(r, g, b)| perceived_brightness(r, g, b) < threshold)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::{
        is_dark, node_style, parse_hex_color, relation_style, relation_tools, Palette,
    };
    use crate::model::RelationModeType;

    #[test]
    fn parses_short_and_long_hex_colors() {
        assert_eq!(parse_hex_color("#fff"), Some((255, 255, 255)));
        assert_eq!(parse_hex_color("102030"), Some((16, 32, 48)));
        assert_eq!(parse_hex_color("red"), None);
        assert_eq!(parse_hex_color("#12345"), None);
    }

    #[test]
    fn label_contrasts_with_fill() {
        let palette = Palette::default();
        let dark = node_style("#102030", "#000000", &palette, 128.0, None);
        assert_eq!(dark.label_fill, palette.light_label);

        let light = node_style("#f0f0f0", "#000000", &palette, 128.0, None);
        assert_eq!(light.label_fill, palette.dark_label);

        let forced = node_style("#102030", "#000000", &palette, 128.0, Some("#ff0000"));
        assert_eq!(forced.label_fill, "#ff0000");
    }

    #[test]
    fn unknown_colors_are_treated_as_light() {
        assert!(!is_dark("tomato", 128.0));
        assert!(is_dark("#000", 128.0));
    }

    #[test]
    fn only_visual_relations_expose_endpoint_and_remove_tools() {
        let visual = relation_tools(RelationModeType::Visual);
        assert!(visual.endpoint_drag && visual.remove && visual.vertices);

        for mode in [RelationModeType::Normal, RelationModeType::Faint] {
            let tools = relation_tools(mode);
            assert!(tools.vertices);
            assert!(!tools.endpoint_drag);
            assert!(!tools.remove);
        }
    }

    #[test]
    fn faint_relations_are_dimmed() {
        let palette = Palette::default();
        let faint = relation_style(RelationModeType::Faint, &palette);
        assert!(faint.dashed);
        assert!(faint.opacity < 1.0);
        assert_eq!(relation_style(RelationModeType::Normal, &palette).opacity, 1.0);
    }
}
