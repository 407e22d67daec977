use ratatui::style::Color;

pub struct Theme {
    pub fg: Color,
    pub primary: Color,   // Blue
    pub secondary: Color, // Orange
    pub comment: Color,   // Grey
    pub success: Color,   // Green
    pub error: Color,     // Red
    pub mnemonic: Color,
    pub number: Color,
    pub border_focused: Color,
    pub border_normal: Color,
    pub current_line_bg: Color,
    pub heat: Color,          // Yellow for execution counts
    pub register: Color,      // Cyan for register names
    pub output_value: Color,  // Pink for emitted values
}

pub const DEFAULT_THEME: Theme = Theme {
    fg: Color::Rgb(205, 214, 244),
    primary: Color::Rgb(137, 180, 250),   // Blue
    secondary: Color::Rgb(250, 179, 135), // Orange
    comment: Color::Rgb(108, 112, 134),
    success: Color::Rgb(166, 227, 161),
    error: Color::Rgb(243, 139, 168),
    mnemonic: Color::Rgb(137, 180, 250),       // Blue for mnemonics
    number: Color::Rgb(250, 179, 135),         // Orange for operands
    border_focused: Color::Rgb(249, 226, 175), // Yellow border for focus
    border_normal: Color::Rgb(108, 112, 134),  // Grey border for normal
    current_line_bg: Color::Rgb(50, 50, 70),   // Slightly lighter BG for current row
    heat: Color::Rgb(249, 226, 175),
    register: Color::Rgb(148, 226, 213),
    output_value: Color::Rgb(245, 194, 231),
};
