//! Send-by-mail dispatch: the municipality directory and the mailto
//! link handed to the user's mail client after an export.
//!
//! The link never carries the document itself; mailto cannot attach
//! files, so the body asks the sender to attach the freshly exported
//! PDF by hand.

use crate::error::DispatchError;

/// One town hall the dossier can be addressed to.
#[derive(Debug, Clone, PartialEq)]
pub struct Municipality {
    pub commune: String,
    pub adresse: String,
    pub telephone: String,
    pub email: String,
    pub site_web: String,
}

impl Municipality {
    fn new(commune: &str, adresse: &str, telephone: &str, email: &str) -> Self {
        Self {
            commune: commune.to_string(),
            adresse: adresse.to_string(),
            telephone: telephone.to_string(),
            email: email.to_string(),
            site_web: String::new(),
        }
    }
}

/// The Bordeaux Métropole town halls the platform ships with.
pub fn builtin_directory() -> Vec<Municipality> {
    vec![
        Municipality::new("Bordeaux", "Place Pey Berland, 33000 BORDEAUX", "05 56 10 20 30", "contact@mairie-bordeaux.fr"),
        Municipality::new("Blanquefort", "12 rue Dupaty, 33290 BLANQUEFORT", "05 56 95 50 95", "webmaster@ville-blanquefort.fr"),
        Municipality::new("Eysines", "Rue de l\u{2019}Hôtel de Ville, 33320 EYSINES", "05 56 16 18 00", "contact@ville-eysines.fr"),
        Municipality::new("Bruges", "87 avenue Charles de Gaulle, 33520 BRUGES", "05 56 16 80 80", "info@mairie-bruges.fr"),
        Municipality::new("Saint-Médard-en-Jalles", "Place de l\u{2019}Hôtel de ville, 33160 Saint-Médard-en-Jalles", "05 56 57 40 40", "communication@saint-medard-en-jalles.fr"),
        Municipality::new("Parempuyre", "1 avenue Philippe Durand Dassier, 33290 PAREMPUYRE", "05 56 95 56 20", "ville@parempuyre.fr"),
        Municipality::new("Mérignac", "60 avenue Maréchal De Lattre de Tassigny, 33700 MERIGNAC", "05 56 55 66 00", "contact@ville-merignac33.fr"),
        Municipality::new("Pessac", "Place de la Vè République BP40096, 33604 PESSAC cedex", "05 57 02 20 20", "courrier@mairie-pessac.fr"),
        Municipality::new("Talence", "Rue du Professeur Arnozan, 33400 TALENCE", "05 56 84 78 33", "info@mairie-talence.fr"),
        Municipality::new("Villenave-d\u{2019}Ornon", "12 rue du Professeur Calmette, 33140 VILLENAVE D\u{2019}ORNON", "05 56 75 69 00", "communication@mairie-villenavedornon.fr"),
        Municipality::new("Bègles", "77 rue Calixte Camelle, 33130 BEGLES", "05 56 49 88 88", "contact@mairie-begles.fr"),
        Municipality::new("Gradignan", "Allée Gaston Rodrigues, 33170 GRADIGNAN", "05 56 75 65 00", "juridique@ville-gradignan.fr"),
        Municipality::new("Le Bouscat", "Place Gambetta, 33110 LE BOUSCAT", "05 57 22 26 66", "contact.lebouscat@mairie-le-bouscat.fr"),
        Municipality::new("Lormont", "Rue André Dupin, 33310 LORMONT", "05 57 77 63 27", "mairie@ville-lormont.fr"),
        Municipality::new("Floirac", "6 avenue Pasteur, 33270 FLOIRAC", "05 57 80 87 00", "contact@ville-floirac33.fr"),
        Municipality::new("Cenon", "1 avenue Carnot, 33150 CENON", "05 57 80 70 00", "info@ville-cenon.fr"),
        Municipality::new("Le Haillan", "137 avenue Pasteur, 33185 LE HAILLAN", "05 57 93 11 11", "lehaillan@wanadoo.fr"),
        Municipality::new("Le Taillan-Médoc", "Place Michel Réglade, 33320 LE TAILLAN MEDOC", "05 56 35 50 60", "mairie@taillan-medoc.fr"),
        Municipality::new("Carbon-Blanc", "Avenue Vignau Anglade, 33560 CARBON BLANC", "05 57 77 68 68", "communication@carbon-blanc.fr"),
        Municipality::new("Bouliac", "20 place Camille Hosteins, 33270 BOULIAC", "05 57 97 18 18", "mairie@ville-bouliac.fr"),
    ]
}

/// Looks a municipality up by its commune name.
pub fn find_municipality(directory: &[Municipality], commune: &str) -> Option<Municipality> {
    directory.iter().find(|m| m.commune == commune).cloned()
}

/// Builds the pre-filled mailto link for a candidature. Assumes the
/// PDF named `pdf_file_name` was already exported; the caller sends
/// the link to the user's mail client.
pub fn mailto_link(
    municipality: &Municipality,
    project_name: &str,
    structure_name: &str,
    pdf_file_name: &str,
) -> Result<String, DispatchError> {
    if municipality.email.trim().is_empty() {
        return Err(DispatchError::MissingEmail { commune: municipality.commune.clone() });
    }
    let subject = format!("Candidature Spontanée : {project_name}");
    let body = format!(
        "Bonjour,\n\n\
         Veuillez trouver en pièce jointe notre dossier de candidature pour le projet \"{project_name}\".\n\n\
         Ce dossier a été généré via la plateforme AssoCall AI.\n\n\
         Cordialement,\n\
         {structure_name}\n\n\
         ---\n\
         Cet e-mail a été pré-rempli par AssoCall. N'oubliez pas de joindre le fichier PDF \"{pdf_file_name}\" qui vient d'être téléchargé sur votre ordinateur avant d'envoyer."
    );
    Ok(format!(
        "mailto:{}?subject={}&body={}",
        municipality.email,
        urlencoding::encode(&subject),
        urlencoding::encode(&body)
    ))
}
