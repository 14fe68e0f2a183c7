//! Human-readable names for picked colors.

use palette::color_difference::Ciede2000;
use palette::{named, FromColor, Lab, Srgb};

use crate::color::{parse_hex, ColorSample};

// CSS/SVG keyword colors. Aliases sharing a value (aqua/cyan,
// fuchsia/magenta) resolve to the first entry; the "grey" spellings are left out.
const NAMED_COLORS: &[(&str, Srgb<u8>)] = &[
    ("Alice Blue", named::ALICEBLUE),
    ("Antique White", named::ANTIQUEWHITE),
    ("Aqua", named::AQUA),
    ("Aquamarine", named::AQUAMARINE),
    ("Azure", named::AZURE),
    ("Beige", named::BEIGE),
    ("Bisque", named::BISQUE),
    ("Black", named::BLACK),
    ("Blanched Almond", named::BLANCHEDALMOND),
    ("Blue", named::BLUE),
    ("Blue Violet", named::BLUEVIOLET),
    ("Brown", named::BROWN),
    ("Burly Wood", named::BURLYWOOD),
    ("Cadet Blue", named::CADETBLUE),
    ("Chartreuse", named::CHARTREUSE),
    ("Chocolate", named::CHOCOLATE),
    ("Coral", named::CORAL),
    ("Cornflower Blue", named::CORNFLOWERBLUE),
    ("Cornsilk", named::CORNSILK),
    ("Crimson", named::CRIMSON),
    ("Cyan", named::CYAN),
    ("Dark Blue", named::DARKBLUE),
    ("Dark Cyan", named::DARKCYAN),
    ("Dark Goldenrod", named::DARKGOLDENROD),
    ("Dark Gray", named::DARKGRAY),
    ("Dark Green", named::DARKGREEN),
    ("Dark Khaki", named::DARKKHAKI),
    ("Dark Magenta", named::DARKMAGENTA),
    ("Dark Olive Green", named::DARKOLIVEGREEN),
    ("Dark Orange", named::DARKORANGE),
    ("Dark Orchid", named::DARKORCHID),
    ("Dark Red", named::DARKRED),
    ("Dark Salmon", named::DARKSALMON),
    ("Dark Sea Green", named::DARKSEAGREEN),
    ("Dark Slate Blue", named::DARKSLATEBLUE),
    ("Dark Slate Gray", named::DARKSLATEGRAY),
    ("Dark Turquoise", named::DARKTURQUOISE),
    ("Dark Violet", named::DARKVIOLET),
    ("Deep Pink", named::DEEPPINK),
    ("Deep Sky Blue", named::DEEPSKYBLUE),
    ("Dim Gray", named::DIMGRAY),
    ("Dodger Blue", named::DODGERBLUE),
    ("Fire Brick", named::FIREBRICK),
    ("Floral White", named::FLORALWHITE),
    ("Forest Green", named::FORESTGREEN),
    ("Fuchsia", named::FUCHSIA),
    ("Gainsboro", named::GAINSBORO),
    ("Ghost White", named::GHOSTWHITE),
    ("Gold", named::GOLD),
    ("Goldenrod", named::GOLDENROD),
    ("Gray", named::GRAY),
    ("Green", named::GREEN),
    ("Green Yellow", named::GREENYELLOW),
    ("Honeydew", named::HONEYDEW),
    ("Hot Pink", named::HOTPINK),
    ("Indian Red", named::INDIANRED),
    ("Indigo", named::INDIGO),
    ("Ivory", named::IVORY),
    ("Khaki", named::KHAKI),
    ("Lavender", named::LAVENDER),
    ("Lavender Blush", named::LAVENDERBLUSH),
    ("Lawn Green", named::LAWNGREEN),
    ("Lemon Chiffon", named::LEMONCHIFFON),
    ("Light Blue", named::LIGHTBLUE),
    ("Light Coral", named::LIGHTCORAL),
    ("Light Cyan", named::LIGHTCYAN),
    ("Light Goldenrod Yellow", named::LIGHTGOLDENRODYELLOW),
    ("Light Gray", named::LIGHTGRAY),
    ("Light Green", named::LIGHTGREEN),
    ("Light Pink", named::LIGHTPINK),
    ("Light Salmon", named::LIGHTSALMON),
    ("Light Sea Green", named::LIGHTSEAGREEN),
    ("Light Sky Blue", named::LIGHTSKYBLUE),
    ("Light Slate Gray", named::LIGHTSLATEGRAY),
    ("Light Steel Blue", named::LIGHTSTEELBLUE),
    ("Light Yellow", named::LIGHTYELLOW),
    ("Lime", named::LIME),
    ("Lime Green", named::LIMEGREEN),
    ("Linen", named::LINEN),
    ("Magenta", named::MAGENTA),
    ("Maroon", named::MAROON),
    ("Medium Aquamarine", named::MEDIUMAQUAMARINE),
    ("Medium Blue", named::MEDIUMBLUE),
    ("Medium Orchid", named::MEDIUMORCHID),
    ("Medium Purple", named::MEDIUMPURPLE),
    ("Medium Sea Green", named::MEDIUMSEAGREEN),
    ("Medium Slate Blue", named::MEDIUMSLATEBLUE),
    ("Medium Spring Green", named::MEDIUMSPRINGGREEN),
    ("Medium Turquoise", named::MEDIUMTURQUOISE),
    ("Medium Violet Red", named::MEDIUMVIOLETRED),
    ("Midnight Blue", named::MIDNIGHTBLUE),
    ("Mint Cream", named::MINTCREAM),
    ("Misty Rose", named::MISTYROSE),
    ("Moccasin", named::MOCCASIN),
    ("Navajo White", named::NAVAJOWHITE),
    ("Navy", named::NAVY),
    ("Old Lace", named::OLDLACE),
    ("Olive", named::OLIVE),
    ("Olive Drab", named::OLIVEDRAB),
    ("Orange", named::ORANGE),
    ("Orange Red", named::ORANGERED),
    ("Orchid", named::ORCHID),
    ("Pale Goldenrod", named::PALEGOLDENROD),
    ("Pale Green", named::PALEGREEN),
    ("Pale Turquoise", named::PALETURQUOISE),
    ("Pale Violet Red", named::PALEVIOLETRED),
    ("Papaya Whip", named::PAPAYAWHIP),
    ("Peach Puff", named::PEACHPUFF),
    ("Peru", named::PERU),
    ("Pink", named::PINK),
    ("Plum", named::PLUM),
    ("Powder Blue", named::POWDERBLUE),
    ("Purple", named::PURPLE),
    ("Red", named::RED),
    ("Rosy Brown", named::ROSYBROWN),
    ("Royal Blue", named::ROYALBLUE),
    ("Saddle Brown", named::SADDLEBROWN),
    ("Salmon", named::SALMON),
    ("Sandy Brown", named::SANDYBROWN),
    ("Sea Green", named::SEAGREEN),
    ("Seashell", named::SEASHELL),
    ("Sienna", named::SIENNA),
    ("Silver", named::SILVER),
    ("Sky Blue", named::SKYBLUE),
    ("Slate Blue", named::SLATEBLUE),
    ("Slate Gray", named::SLATEGRAY),
    ("Snow", named::SNOW),
    ("Spring Green", named::SPRINGGREEN),
    ("Steel Blue", named::STEELBLUE),
    ("Tan", named::TAN),
    ("Teal", named::TEAL),
    ("Thistle", named::THISTLE),
    ("Tomato", named::TOMATO),
    ("Turquoise", named::TURQUOISE),
    ("Violet", named::VIOLET),
    ("Wheat", named::WHEAT),
    ("White", named::WHITE),
    ("White Smoke", named::WHITESMOKE),
    ("Yellow", named::YELLOW),
    ("Yellow Green", named::YELLOWGREEN),
];

/// Name of the CSS color closest to `hex` (CIEDE2000 in Lab), or `None` when
/// `hex` is not a valid `#RRGGBB`.
pub fn color_name(hex: &str) -> Option<String> {
    parse_hex(hex).ok().map(|sample| nearest_name(sample).to_string())
}

pub fn nearest_name(sample: ColorSample) -> &'static str {
    let target: Lab = Lab::from_color(sample.to_srgb());

    let mut best = ("", f32::INFINITY);
    for (name, color) in NAMED_COLORS {
        let lab: Lab = Lab::from_color(color.into_format::<f32>());
        let distance = target.difference(lab);
        if distance < best.1 {
            best = (*name, distance);
        }
    }
    best.0
}
