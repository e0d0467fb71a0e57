// Multi-language support module
// Localized prompts, messages and error texts for English and Chinese

use crate::txs_board::BoardError;
use crate::txs_input::{InputError, SettingField};
use crate::txs_square::SquareError;

#[derive(Clone)]
pub struct Assets {
    pub title: &'static str,

    // Main menu
    pub menu_prompt: &'static str,
    pub menu_exit: &'static str,
    pub menu_new: &'static str,
    pub menu_settings: &'static str,

    // Settings prompts
    pub setting_prompt_fmt: &'static str, // "Please, set the {}"
    pub field_height: &'static str,
    pub field_width: &'static str,
    pub field_mines: &'static str,

    // Play prompts
    pub square_prompt: &'static str,
    pub mode_prompt: &'static str,
    pub board_title_fmt: &'static str, // "{} x {}, {} mines"
    pub status_fmt: &'static str,      // " Mines left: {}   Opened: {}/{} "

    // End of game
    pub win_message: &'static str,
    pub loss_message: &'static str,
    pub any_key: &'static str,

    // Input errors
    pub err_empty_menu: &'static str,
    pub err_not_number: &'static str,
    pub err_unknown_option: &'static str,
    pub err_empty_square: &'static str,
    pub err_bad_square: &'static str,
    pub err_empty_mode: &'static str,
    pub err_bad_mode: &'static str,
    pub err_empty_setting_fmt: &'static str,  // "Please, give input for game's {}"
    pub err_setting_number_fmt: &'static str, // "Please, input number for game's {}"
    pub err_too_wide_fmt: &'static str,       // "... at most {} columns"

    // Board errors
    pub err_dimensions_fmt: &'static str, // "... from {} to {}"
    pub err_mines_fmt: &'static str,      // "... from 1 to {}"
    pub err_out_of_bounds: &'static str,
    pub err_opened: &'static str,
    pub err_flagged: &'static str,
    pub err_game_over: &'static str,

    // Terminal size messages
    pub tsmsg_line1: &'static str,
    pub tsmsg_line2: &'static str,
    pub tsmsg_title: &'static str,
}

/// Returns English language assets
pub fn english_assets() -> Assets {
    Assets {
        title: "Minesweeper",

        menu_prompt: "Please choose below options",
        menu_exit: "0. Exit game",
        menu_new: "1. Create new game",
        menu_settings: "2. Setting",

        setting_prompt_fmt: "Please, set the {}",
        field_height: "height",
        field_width: "width",
        field_mines: "mine quantity",

        square_prompt: "Please, choose square to open or flag (0 for back to Main Menu)",
        mode_prompt: "Please, choose open (o) or toggle flag (x)",
        board_title_fmt: "{} x {}, {} mines",
        status_fmt: " Mines left: {}   Opened: {}/{} ",

        win_message: "You win, congratulation!",
        loss_message: "Oops! You opened the mine! Game over.",
        any_key: "Press any key to return to the main menu",

        err_empty_menu: "Please, choose one of main menu option",
        err_not_number: "Please, input the number",
        err_unknown_option: "Please, input 0, 1 or 2",
        err_empty_square: "Please, choose square for open",
        err_bad_square: "Please, input 0 or valid square choose pattern (Ex: a1, b12)",
        err_empty_mode: "Please, choose square for open or toggle flag",
        err_bad_mode: "Please, input o or x value",
        err_empty_setting_fmt: "Please, give input for game's {}",
        err_setting_number_fmt: "Please, input number for game's {}",
        err_too_wide_fmt: "In console mode, board width must be less than or equal {} columns",

        err_dimensions_fmt: "Board's height and width must be from {} to {}",
        err_mines_fmt: "Board's mine quantity must be from 1 to {}",
        err_out_of_bounds: "Chosen square out of bound",
        err_opened: "Square has been opened",
        err_flagged: "Square has been flagged, remove the flag before opening it",
        err_game_over: "The game is over",

        tsmsg_line1: "Terminal layout too small",
        tsmsg_line2: "Minimum size required: {} x {}",
        tsmsg_title: "Resize needed",
    }
}

/// Returns Chinese language assets
pub fn chinese_assets() -> Assets {
    Assets {
        title: "扫雷",

        menu_prompt: "请选择以下选项",
        menu_exit: "0. 退出游戏",
        menu_new: "1. 新游戏",
        menu_settings: "2. 设置",

        setting_prompt_fmt: "请输入{}",
        field_height: "高度",
        field_width: "宽度",
        field_mines: "地雷数",

        square_prompt: "请选择要打开或标记的格子（输入 0 返回主菜单）",
        mode_prompt: "请选择打开 (o) 或切换标记 (x)",
        board_title_fmt: "{} x {}，{} 个雷",
        status_fmt: " 剩余地雷: {}   已打开: {}/{} ",

        win_message: "恭喜，你赢了！",
        loss_message: "哎呀！踩到地雷了！游戏结束。",
        any_key: "按任意键返回主菜单",

        err_empty_menu: "请选择一个主菜单选项",
        err_not_number: "请输入数字",
        err_unknown_option: "请输入 0、1 或 2",
        err_empty_square: "请选择要打开的格子",
        err_bad_square: "请输入 0 或有效的格子坐标（例如 a1、b12）",
        err_empty_mode: "请选择打开或切换标记",
        err_bad_mode: "请输入 o 或 x",
        err_empty_setting_fmt: "请输入游戏的{}",
        err_setting_number_fmt: "游戏的{}必须是数字",
        err_too_wide_fmt: "控制台模式下，宽度不能超过 {} 列",

        err_dimensions_fmt: "高度和宽度必须在 {} 到 {} 之间",
        err_mines_fmt: "地雷数必须在 1 到 {} 之间",
        err_out_of_bounds: "所选格子超出范围",
        err_opened: "该格子已打开",
        err_flagged: "该格子已标记，请先取消标记",
        err_game_over: "游戏已结束",

        tsmsg_line1: "终端窗口太小",
        tsmsg_line2: "最小尺寸：{} x {}",
        tsmsg_title: "请调整大小",
    }
}

/// Replace each "{}" in `fmt` with the next argument, in order
pub fn fill(fmt: &str, args: &[&dyn std::fmt::Display]) -> String {
    let mut out = String::with_capacity(fmt.len());
    let mut rest = fmt;
    for arg in args {
        match rest.find("{}") {
            Some(pos) => {
                out.push_str(&rest[..pos]);
                out.push_str(&arg.to_string());
                rest = &rest[pos + 2..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

/// Supported language code for a locale or user setting
/// "zh", "zh-CN", "zh_TW" map to "zh"; anything else falls back to "en"
pub fn normalize(lang_code: &str) -> &'static str {
    if lang_code.to_lowercase().starts_with("zh") {
        "zh"
    } else {
        "en"
    }
}

/// Main language manager struct
/// Holds the active string assets
pub struct Lang {
    pub assets: Assets,
}

impl Lang {
    /// Creates a new Lang instance from a language code or locale
    pub fn new(lang_code: &str) -> Self {
        let code = normalize(lang_code);

        Lang {
            assets: if code == "zh" {
                chinese_assets()
            } else {
                english_assets()
            },
        }
    }

    pub fn field_name(&self, field: SettingField) -> &'static str {
        match field {
            SettingField::Height => self.assets.field_height,
            SettingField::Width => self.assets.field_width,
            SettingField::Mines => self.assets.field_mines,
        }
    }

    /// Message for a rejected menu line
    pub fn menu_error(&self, e: &InputError) -> String {
        match e {
            InputError::Empty => self.assets.err_empty_menu.to_string(),
            InputError::UnknownOption(_) => self.assets.err_unknown_option.to_string(),
            _ => self.assets.err_not_number.to_string(),
        }
    }

    /// Message for a rejected square or mode line
    pub fn play_error(&self, e: &InputError, asking_mode: bool) -> String {
        let a = &self.assets;
        match e {
            InputError::Empty if asking_mode => a.err_empty_mode.to_string(),
            InputError::Empty => a.err_empty_square.to_string(),
            InputError::BadMode(_) => a.err_bad_mode.to_string(),
            _ => a.err_bad_square.to_string(),
        }
    }

    /// Message for a rejected settings line
    pub fn setting_error(&self, e: &InputError, field: SettingField) -> String {
        let a = &self.assets;
        let name = self.field_name(field);
        match e {
            InputError::Empty => fill(a.err_empty_setting_fmt, &[&name]),
            InputError::TooWide { max } => fill(a.err_too_wide_fmt, &[max]),
            _ => fill(a.err_setting_number_fmt, &[&name]),
        }
    }

    pub fn board_error(&self, e: &BoardError) -> String {
        let a = &self.assets;
        match e {
            BoardError::InvalidDimensions { min, max } => fill(a.err_dimensions_fmt, &[min, max]),
            BoardError::InvalidMineCount { max } => fill(a.err_mines_fmt, &[max]),
            BoardError::OutOfBounds { .. } => a.err_out_of_bounds.to_string(),
            BoardError::Square(SquareError::AlreadyOpened) => a.err_opened.to_string(),
            BoardError::Square(SquareError::Flagged) => a.err_flagged.to_string(),
            BoardError::GameOver => a.err_game_over.to_string(),
            other => other.to_string(),
        }
    }
}
