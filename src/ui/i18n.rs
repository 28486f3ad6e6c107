use crate::engine::models::CloseBehavior;
use crate::engine::state::{InfoText, PopupKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Spanish,
    French,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::English, Language::Spanish, Language::French];

    pub const fn display_name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Español",
            Language::French => "Français",
        }
    }

    /// Code stored in the client settings; read back with [`parse_locale_token`].
    pub const fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
            Language::French => "fr",
        }
    }
}

const LOCALE_LANGUAGE_CODES: [(&[&str], Language); 3] = [
    (&["es", "spa"], Language::Spanish),
    (&["fr", "fra", "fre"], Language::French),
    (&["en", "eng"], Language::English),
];

pub fn parse_locale_token(token: &str) -> Option<Language> {
    let normalized = token
        .split(['.', '@'])
        .next()
        .unwrap_or(token)
        .replace('-', "_")
        .to_ascii_lowercase();
    let language_code = normalized.split('_').next().unwrap_or(&normalized);

    LOCALE_LANGUAGE_CODES.iter().find_map(|(codes, language)| {
        codes
            .iter()
            .any(|code| *code == language_code)
            .then_some(*language)
    })
}

pub fn detect_system_language() -> Language {
    for var in ["LC_ALL", "LANGUAGE", "LANG"] {
        if let Ok(value) = std::env::var(var) {
            for token in value.split(':') {
                if let Some(language) = parse_locale_token(token) {
                    return language;
                }
            }
        }
    }

    Language::English
}

const MONTHS_EN: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];
const MONTHS_ES: [&str; 12] = [
    "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto", "septiembre",
    "octubre", "noviembre", "diciembre",
];
const MONTHS_FR: [&str; 12] = [
    "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août", "septembre",
    "octobre", "novembre", "décembre",
];

#[derive(Debug, Clone, Copy)]
pub struct I18n {
    language: Language,
}

impl I18n {
    #[must_use]
    pub const fn new(language: Language) -> Self {
        Self { language }
    }

    fn pick<'a>(self, english: &'a str, spanish: &'a str, french: &'a str) -> &'a str {
        match self.language {
            Language::English => english,
            Language::Spanish => spanish,
            Language::French => french,
        }
    }

    /// Month name for a 1-based month number.
    pub fn month_name(self, month: u32) -> &'static str {
        let table = match self.language {
            Language::English => &MONTHS_EN,
            Language::Spanish => &MONTHS_ES,
            Language::French => &MONTHS_FR,
        };
        let index = month.clamp(1, 12) as usize - 1;
        table[index]
    }

    pub fn heading(self) -> &'static str {
        self.pick("Home", "Inicio", "Accueil")
    }

    pub fn play_button(self) -> &'static str {
        self.pick("Play", "Jugar", "Jouer")
    }

    pub fn settings_button(self) -> &'static str {
        self.pick("Settings", "Ajustes", "Paramètres")
    }

    pub fn pick_instance_button(self) -> &'static str {
        self.pick("Instances", "Instancias", "Instances")
    }

    pub fn instance_menu_title(self) -> &'static str {
        self.pick("Choose an instance", "Elige una instancia", "Choisir une instance")
    }

    pub fn no_instance_selected(self) -> &'static str {
        self.pick("No instance", "Sin instancia", "Aucune instance")
    }

    pub fn close_button(self) -> &'static str {
        self.pick("Close", "Cerrar", "Fermer")
    }

    pub fn back_button(self) -> &'static str {
        self.pick("Back", "Volver", "Retour")
    }

    pub fn news_heading(self) -> &'static str {
        self.pick("News", "Noticias", "Actualités")
    }

    pub fn news_empty_title(self) -> &'static str {
        self.pick(
            "No news is currently available.",
            "No hay noticias disponibles por ahora.",
            "Aucune news n'est actuellement disponible.",
        )
    }

    pub fn news_empty_body(self) -> &'static str {
        self.pick(
            "All news about the server will show up here.",
            "Aquí podrás seguir todas las noticias del servidor.",
            "Vous pourrez suivre ici toutes les news relatives au serveur.",
        )
    }

    pub fn news_failed_title(self) -> &'static str {
        self.pick("Error.", "Error.", "Erreur.")
    }

    pub fn news_failed_body(self) -> &'static str {
        self.pick(
            "Unable to contact the news server. Please check your configuration.",
            "No se pudo contactar con el servidor de noticias. Revisa tu configuración.",
            "Impossible de contacter le serveur des news. Merci de vérifier votre configuration.",
        )
    }

    pub fn news_author(self, author: &str) -> String {
        match self.language {
            Language::English => format!("Author - {author}"),
            Language::Spanish => format!("Autor - {author}"),
            Language::French => format!("Auteur - {author}"),
        }
    }

    pub fn info(self, info: InfoText) -> String {
        match info {
            InfoText::Connecting => self.pick("Connecting...", "Conectando...", "Connexion...").into(),
            InfoText::Verifying => self.pick("Verifying", "Verificando", "Vérification").into(),
            InfoText::Downloading(pct) => match self.language {
                Language::English => format!("Downloading {pct}%"),
                Language::Spanish => format!("Descargando {pct}%"),
                Language::French => format!("Téléchargement {pct}%"),
            },
            InfoText::Checking(pct) => match self.language {
                Language::English => format!("Checking {pct}%"),
                Language::Spanish => format!("Verificando {pct}%"),
                Language::French => format!("Vérification {pct}%"),
            },
            InfoText::Patching => self.pick("Patching", "Parche en curso", "Patch en cours").into(),
            InfoText::Starting => self
                .pick("Starting the game", "Iniciando el juego", "Démarrage du jeu")
                .into(),
            InfoText::Ready => self.pick("Ready", "Listo", "Prêt").into(),
        }
    }

    pub fn popup_title(self, kind: &PopupKind) -> &'static str {
        match kind {
            PopupKind::LoginRequired => {
                self.pick("Log in to play", "Inicia sesión para jugar", "Connectez-vous pour jouer")
            }
            PopupKind::NoInstance => {
                self.pick("No instance", "Sin instancia", "Aucune instance")
            }
            PopupKind::AlreadyRunning => {
                self.pick("Please wait", "Espera", "Patientez")
            }
            PopupKind::LaunchFailed(_) => self.pick("Error", "Error", "Erreur"),
        }
    }

    pub fn popup_body(self, kind: &PopupKind) -> String {
        match kind {
            PopupKind::LoginRequired => self
                .pick(
                    "No account is selected. Log in or continue in offline mode.",
                    "No hay ninguna cuenta seleccionada. Inicia sesión o usa el modo sin conexión.",
                    "Aucun compte n'est sélectionné. Connectez-vous ou passez en mode hors ligne.",
                )
                .into(),
            PopupKind::NoInstance => self
                .pick(
                    "No instance is available to launch right now.",
                    "No hay ninguna instancia disponible para iniciar.",
                    "Aucune instance n'est disponible pour le moment.",
                )
                .into(),
            PopupKind::AlreadyRunning => self
                .pick(
                    "A launch is already in progress.",
                    "Ya hay un lanzamiento en curso.",
                    "Un lancement est déjà en cours.",
                )
                .into(),
            PopupKind::LaunchFailed(Some(message)) => message.clone(),
            PopupKind::LaunchFailed(None) => self
                .pick(
                    "Something went wrong while launching the game.",
                    "Hay un error con el lanzamiento.",
                    "Une erreur est survenue lors du lancement.",
                )
                .into(),
        }
    }

    pub fn login_button(self) -> &'static str {
        self.pick("Log in", "Iniciar sesión", "Connexion")
    }

    pub fn offline_button(self) -> &'static str {
        self.pick(
            "No premium (offline mode)",
            "No premium (modo sin conexión)",
            "Non premium (mode hors ligne)",
        )
    }

    pub fn login_heading(self) -> &'static str {
        self.pick("Offline account", "Cuenta sin conexión", "Compte hors ligne")
    }

    pub fn player_name_label(self) -> &'static str {
        self.pick("Player name", "Nombre de jugador", "Pseudo")
    }

    pub fn add_account_button(self) -> &'static str {
        self.pick("Add account", "Añadir cuenta", "Ajouter le compte")
    }

    pub fn settings_heading(self) -> &'static str {
        self.settings_button()
    }

    pub fn memory_min_label(self) -> &'static str {
        self.pick("Minimum memory (GiB)", "Memoria mínima (GiB)", "Mémoire minimale (Gio)")
    }

    pub fn memory_max_label(self) -> &'static str {
        self.pick("Maximum memory (GiB)", "Memoria máxima (GiB)", "Mémoire maximale (Gio)")
    }

    pub fn screen_label(self) -> &'static str {
        self.pick("Game window size", "Tamaño de ventana", "Taille de la fenêtre")
    }

    pub fn java_path_label(self) -> &'static str {
        self.pick("Java path", "Ruta de Java", "Chemin de Java")
    }

    pub fn java_path_hint(self) -> &'static str {
        self.pick(
            "Leave empty for automatic",
            "Vacío para automático",
            "Laisser vide pour automatique",
        )
    }

    pub fn close_behavior_label(self) -> &'static str {
        self.pick(
            "When the game starts",
            "Al iniciar el juego",
            "Au lancement du jeu",
        )
    }

    pub fn close_behavior_value(self, behavior: CloseBehavior) -> &'static str {
        match behavior {
            CloseBehavior::CloseAll => self.pick(
                "Close the game with the launcher",
                "Cerrar el juego con el launcher",
                "Fermer le jeu avec le launcher",
            ),
            CloseBehavior::CloseLauncher => self.pick(
                "Hide the launcher",
                "Ocultar el launcher",
                "Masquer le launcher",
            ),
            CloseBehavior::KeepOpen => self.pick(
                "Keep the launcher open",
                "Mantener el launcher abierto",
                "Garder le launcher ouvert",
            ),
        }
    }

    pub fn theme_label(self) -> &'static str {
        self.pick("Theme", "Tema", "Thème")
    }

    pub fn theme_name(self, dark: bool) -> &'static str {
        if dark {
            self.pick("Dark", "Oscuro", "Sombre")
        } else {
            self.pick("Light", "Claro", "Clair")
        }
    }

    pub fn save_button(self) -> &'static str {
        self.pick("Save", "Guardar", "Enregistrer")
    }

    pub fn language_label(self) -> &'static str {
        self.pick("Language", "Idioma", "Langue")
    }

    pub fn estimated(self, text: &str) -> String {
        match self.language {
            Language::English => format!("Time left: {text}"),
            Language::Spanish => format!("Tiempo restante: {text}"),
            Language::French => format!("Temps restant : {text}"),
        }
    }

    pub fn server_status(self, name: &str, ip: &str, port: u16) -> String {
        match self.language {
            Language::English => format!("Server {name} ({ip}:{port})"),
            Language::Spanish => format!("Servidor {name} ({ip}:{port})"),
            Language::French => format!("Serveur {name} ({ip}:{port})"),
        }
    }
}
