pub const MAIN_MENU: &str = "
Select an option:
1. Login to my account
2. Create an account
(0. Close the program)
";

pub const SESSION_MENU: &str = "
Select an option:
1. Deposit
2. Withdraw
3. View balance
4. Delete account
0. Log out
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainChoice {
    Exit,
    Login,
    CreateAccount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionChoice {
    LogOut,
    Deposit,
    Withdraw,
    ViewBalance,
    DeleteAccount,
}

/// Plain digits only: signs, blanks inside the number and words are rejected.
fn parse_option(input: &str) -> Option<u8> {
    let input = input.trim();
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    input.parse().ok()
}

impl MainChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match parse_option(input)? {
            0 => Some(Self::Exit),
            1 => Some(Self::Login),
            2 => Some(Self::CreateAccount),
            _ => None,
        }
    }
}

impl SessionChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match parse_option(input)? {
            0 => Some(Self::LogOut),
            1 => Some(Self::Deposit),
            2 => Some(Self::Withdraw),
            3 => Some(Self::ViewBalance),
            4 => Some(Self::DeleteAccount),
            _ => None,
        }
    }
}
