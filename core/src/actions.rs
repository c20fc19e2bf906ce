//! Action codes understood by the game engine.
//! An action index chosen by the agent resolves to one ASCII code; commands with
//! the meta bit or control bit set follow the terminal conventions of the game.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::EngineError;

const fn meta(c: u8) -> u8 { 0x80 | c }
const fn ctrl(c: u8) -> u8 { 0x1f & c }

/// Raw keystroke code sent to the engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionCode(pub u8);

impl ActionCode {
    pub fn as_u8(self) -> u8 { self.0 }
}

/// Confirmation keystroke. Shares its code with the north-west move.
pub const YES: ActionCode = ActionCode(b'y');

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CompassDirection {
    N = b'k',
    E = b'l',
    S = b'j',
    W = b'h',
    NE = b'u',
    SE = b'n',
    SW = b'b',
    NW = b'y',
}

impl CompassDirection {
    pub const ALL: [CompassDirection; 8] = [
        CompassDirection::N,
        CompassDirection::E,
        CompassDirection::S,
        CompassDirection::W,
        CompassDirection::NE,
        CompassDirection::SE,
        CompassDirection::SW,
        CompassDirection::NW,
    ];

    pub fn code(self) -> ActionCode { ActionCode(self as u8) }

    pub fn from_code(code: ActionCode) -> Option<CompassDirection> {
        CompassDirection::ALL.into_iter().find(|d| d.code() == code)
    }

    /// Screen offset `(dx, dy)`; y grows southwards.
    pub fn delta(self) -> (i64, i64) {
        match self {
            CompassDirection::N => (0, -1),
            CompassDirection::E => (1, 0),
            CompassDirection::S => (0, 1),
            CompassDirection::W => (-1, 0),
            CompassDirection::NE => (1, -1),
            CompassDirection::SE => (1, 1),
            CompassDirection::SW => (-1, 1),
            CompassDirection::NW => (-1, -1),
        }
    }

    /// Direction towards tile `index` of the 3x3 neighbourhood, row-major from the
    /// north-west corner. The centre tile (4) is the agent and has no direction.
    pub fn from_neighbor_index(index: usize) -> Option<CompassDirection> {
        match index {
            0 => Some(CompassDirection::NW),
            1 => Some(CompassDirection::N),
            2 => Some(CompassDirection::NE),
            3 => Some(CompassDirection::W),
            5 => Some(CompassDirection::E),
            6 => Some(CompassDirection::SW),
            7 => Some(CompassDirection::S),
            8 => Some(CompassDirection::SE),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MiscDirection {
    Up = b'<',
    Down = b'>',
    Wait = b'.',
}

impl MiscDirection {
    pub fn code(self) -> ActionCode { ActionCode(self as u8) }
}

/// Named game commands. Discriminants are the keystroke codes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Command {
    Extcmd = b'#',
    Extlist = meta(b'?'),
    Adjust = meta(b'a'),
    Annotate = meta(b'A'),
    Apply = b'a',
    Attributes = ctrl(b'x'),
    Autopickup = b'@',
    Call = b'C',
    Cast = b'Z',
    Chat = meta(b'c'),
    Close = b'c',
    Conduct = meta(b'C'),
    Dip = meta(b'd'),
    Down = b'>',
    Drop = b'd',
    Droptype = b'D',
    Eat = b'e',
    Esc = ctrl(b'['),
    Engrave = b'E',
    Enhance = meta(b'e'),
    Fire = b'f',
    Fight = b'F',
    Force = meta(b'f'),
    Glance = b';',
    History = b'V',
    Inventory = b'i',
    Inventtype = b'I',
    Invoke = meta(b'i'),
    Jump = meta(b'j'),
    Kick = ctrl(b'd'),
    Known = b'\\',
    Knownclass = b'`',
    Look = b':',
    Loot = meta(b'l'),
    Monster = meta(b'm'),
    More = b'\r',
    Move = b'm',
    Movefar = b'M',
    Offer = meta(b'o'),
    Open = b'o',
    Options = b'O',
    Overview = ctrl(b'o'),
    Pay = b'p',
    Pickup = b',',
    Pray = meta(b'p'),
    Prevmsg = ctrl(b'p'),
    Puton = b'P',
    Quaff = b'q',
    Quit = meta(b'q'),
    Quiver = b'Q',
    Read = b'r',
    Redraw = ctrl(b'r'),
    Remove = b'R',
    Ride = meta(b'R'),
    Rub = meta(b'r'),
    Rush = b'g',
    Save = b'S',
    Search = b's',
    Seeall = b'*',
    Seetrap = b'^',
    Sit = meta(b's'),
    Swap = b'x',
    Takeoff = b'T',
    Takeoffall = b'A',
    Teleport = ctrl(b't'),
    Throw = b't',
    Tip = meta(b'T'),
    Travel = b'_',
    Turn = meta(b't'),
    Twoweapon = b'X',
    Untrap = meta(b'u'),
    Up = b'<',
    Version = meta(b'v'),
    Versionshort = b'v',
    Wear = b'W',
    Whatdoes = b'&',
    Whatis = b'/',
    Wield = b'w',
    Wipe = meta(b'w'),
    Zap = b'z',
}

const COMMAND_NAMES: &[(&str, Command)] = &[
    ("EXTCMD", Command::Extcmd),
    ("EXTLIST", Command::Extlist),
    ("ADJUST", Command::Adjust),
    ("ANNOTATE", Command::Annotate),
    ("APPLY", Command::Apply),
    ("ATTRIBUTES", Command::Attributes),
    ("AUTOPICKUP", Command::Autopickup),
    ("CALL", Command::Call),
    ("CAST", Command::Cast),
    ("CHAT", Command::Chat),
    ("CLOSE", Command::Close),
    ("CONDUCT", Command::Conduct),
    ("DIP", Command::Dip),
    ("DOWN", Command::Down),
    ("DROP", Command::Drop),
    ("DROPTYPE", Command::Droptype),
    ("EAT", Command::Eat),
    ("ESC", Command::Esc),
    ("ENGRAVE", Command::Engrave),
    ("ENHANCE", Command::Enhance),
    ("FIRE", Command::Fire),
    ("FIGHT", Command::Fight),
    ("FORCE", Command::Force),
    ("GLANCE", Command::Glance),
    ("HISTORY", Command::History),
    ("INVENTORY", Command::Inventory),
    ("INVENTTYPE", Command::Inventtype),
    ("INVOKE", Command::Invoke),
    ("JUMP", Command::Jump),
    ("KICK", Command::Kick),
    ("KNOWN", Command::Known),
    ("KNOWNCLASS", Command::Knownclass),
    ("LOOK", Command::Look),
    ("LOOT", Command::Loot),
    ("MONSTER", Command::Monster),
    ("MORE", Command::More),
    ("MOVE", Command::Move),
    ("MOVEFAR", Command::Movefar),
    ("OFFER", Command::Offer),
    ("OPEN", Command::Open),
    ("OPTIONS", Command::Options),
    ("OVERVIEW", Command::Overview),
    ("PAY", Command::Pay),
    ("PICKUP", Command::Pickup),
    ("PRAY", Command::Pray),
    ("PREVMSG", Command::Prevmsg),
    ("PUTON", Command::Puton),
    ("QUAFF", Command::Quaff),
    ("QUIT", Command::Quit),
    ("QUIVER", Command::Quiver),
    ("READ", Command::Read),
    ("REDRAW", Command::Redraw),
    ("REMOVE", Command::Remove),
    ("RIDE", Command::Ride),
    ("RUB", Command::Rub),
    ("RUSH", Command::Rush),
    ("SAVE", Command::Save),
    ("SEARCH", Command::Search),
    ("SEEALL", Command::Seeall),
    ("SEETRAP", Command::Seetrap),
    ("SIT", Command::Sit),
    ("SWAP", Command::Swap),
    ("TAKEOFF", Command::Takeoff),
    ("TAKEOFFALL", Command::Takeoffall),
    ("TELEPORT", Command::Teleport),
    ("THROW", Command::Throw),
    ("TIP", Command::Tip),
    ("TRAVEL", Command::Travel),
    ("TURN", Command::Turn),
    ("TWOWEAPON", Command::Twoweapon),
    ("UNTRAP", Command::Untrap),
    ("UP", Command::Up),
    ("VERSION", Command::Version),
    ("VERSIONSHORT", Command::Versionshort),
    ("WEAR", Command::Wear),
    ("WHATDOES", Command::Whatdoes),
    ("WHATIS", Command::Whatis),
    ("WIELD", Command::Wield),
    ("WIPE", Command::Wipe),
    ("ZAP", Command::Zap),
];

static COMMAND_LOOKUP: OnceCell<HashMap<&'static str, Command>> = OnceCell::new();

impl Command {
    pub fn code(self) -> ActionCode { ActionCode(self as u8) }

    /// Resolve a command by its name, ignoring case ("pray", "PRAY").
    pub fn from_name(name: &str) -> Result<Command, EngineError> {
        let upper = name.to_ascii_uppercase();
        COMMAND_LOOKUP
            .get_or_init(|| COMMAND_NAMES.iter().copied().collect())
            .get(upper.as_str())
            .copied()
            .ok_or(EngineError::UnknownAction(upper))
    }

    pub fn name(self) -> &'static str {
        COMMAND_NAMES
            .iter()
            .find(|(_, c)| *c == self)
            .map(|(n, _)| *n)
            .unwrap_or("UNKNOWN")
    }
}

impl From<Command> for ActionCode {
    fn from(c: Command) -> Self { c.code() }
}

impl From<CompassDirection> for ActionCode {
    fn from(d: CompassDirection) -> Self { d.code() }
}

impl From<MiscDirection> for ActionCode {
    fn from(d: MiscDirection) -> Self { d.code() }
}

/// Move-only action set used by navigation tasks.
pub fn move_actions() -> Vec<ActionCode> {
    CompassDirection::ALL.iter().map(|d| d.code()).collect()
}

/// Moves plus the handful of commands the skill tasks need.
pub fn skill_actions() -> Vec<ActionCode> {
    let mut actions = move_actions();
    actions.extend(
        [
            Command::Eat,
            Command::Wield,
            Command::Wear,
            Command::Puton,
            Command::Pickup,
            Command::Pray,
            Command::Apply,
            Command::Quaff,
            Command::Read,
            Command::Zap,
        ]
        .iter()
        .map(|c| c.code()),
    );
    actions.push(MiscDirection::Down.code());
    actions
}
