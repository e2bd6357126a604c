//! The built-in "Candidature Spontanée" form the platform ships.
//!
//! Nine sections, from the association's identity through signature to
//! the export/send actions. The shape is the same document a JSON
//! schema file would declare; keeping it in code gives compile-time
//! label checking for the conventional paths the rest of the crate
//! relies on (project title, structure name, recipient selector).

use dossier_schema::{AcquisitionMode, FieldSpec, FieldType, FormSchema, Section};

pub fn spontaneous_application_form() -> FormSchema {
    FormSchema {
        module: "Candidature Spontanée".into(),
        version: "1.0".into(),
        description: "Formulaire complet pour générer et envoyer une candidature à un appel à projet ou une subvention.".into(),
        sections: vec![
            general_info(),
            project_presentation(),
            budget(),
            conditions(),
            impact(),
            partners(),
            attachments(),
            signature(),
            export_actions(),
        ],
    }
}

fn general_info() -> Section {
    Section::new("infos_generales", "Informations Générales")
        .field(
            FieldSpec::new("Photo", FieldType::Image)
                .modes([AcquisitionMode::Upload, AcquisitionMode::AiGenerate]),
        )
        .field(
            FieldSpec::new("Nom de la structure", FieldType::Text)
                .placeholder("Ex : Association Praful Studio")
                .required(),
        )
        .field(
            FieldSpec::new("Nom du représentant légal", FieldType::Text)
                .placeholder("Ex : Julien Guerrier")
                .required(),
        )
        .field(
            FieldSpec::new("Adresse complète", FieldType::Text)
                .placeholder("Ex : 15 rue de la Paix, 33290 Parempuyre")
                .required(),
        )
        .field(
            FieldSpec::new("Téléphone", FieldType::Tel)
                .placeholder("Ex : 06 00 00 00 00")
                .required(),
        )
        .field(
            FieldSpec::new("Email", FieldType::Email)
                .placeholder("Ex : contact@praful-studio.fr")
                .required(),
        )
        .field(
            FieldSpec::new("SIRET / RNA", FieldType::Text)
                .placeholder("Ex : 123 456 789 00012")
                .required(),
        )
        .field(FieldSpec::new("Année de création", FieldType::Number).placeholder("Ex : 2017"))
        .field(
            FieldSpec::new("Domaine d\u{2019}activité", FieldType::Select)
                .options(["Culture", "Éducation", "Sport", "Environnement", "Inclusion", "Numérique"])
                .multiple(),
        )
        .field(FieldSpec::new("Site web", FieldType::Url).placeholder("Ex : www.praful-design.fr"))
        .field(
            FieldSpec::new("Réseaux sociaux", FieldType::TextArea)
                .placeholder("Ex : Facebook, Instagram, X"),
        )
}

fn project_presentation() -> Section {
    Section::new("presentation_projet", "Présentation du Projet")
        .field(
            FieldSpec::new("Titre du projet", FieldType::Text)
                .placeholder("Ex : Le Monde de l'Égalité")
                .required(),
        )
        .field(
            FieldSpec::new("Slogan", FieldType::Text)
                .placeholder("Ex : Un projet qui relie les enfants du monde"),
        )
        .field(
            FieldSpec::new("Résumé du projet", FieldType::TextArea)
                .ai_generate()
                .placeholder("Description brève du projet (3-4 phrases)"),
        )
        .field(
            FieldSpec::new("Objectifs du projet", FieldType::List)
                .ai_generate()
                .placeholder("Liste d\u{2019}objectifs concrets"),
        )
        .field(
            FieldSpec::new("Public ciblé", FieldType::Select)
                .options(["Enfants", "Jeunes", "Familles", "Seniors", "Public mixte"])
                .multiple(),
        )
        .field(
            FieldSpec::new("Durée du projet (en mois)", FieldType::DurationSlider)
                .slider_range(1, 36, 12),
        )
}

fn budget() -> Section {
    Section::new("budget_financement", "Budget et Financement")
        .field(
            FieldSpec::new("Coût total estimé (€)", FieldType::Number)
                .placeholder("Ex : 3500")
                .required(),
        )
        .field(
            FieldSpec::new("Financements déjà obtenus (€)", FieldType::Number)
                .placeholder("Ex : 1500"),
        )
        .field(FieldSpec::new("Montant sollicité (€)", FieldType::Number).placeholder("Ex : 2000"))
        .field(
            FieldSpec::new("Détail des dépenses principales", FieldType::Table)
                .columns(["Poste de dépense", "Montant (€)", "Description"])
                .rows_default(3),
        )
        .field(
            FieldSpec::new("Texte automatique de demande de financement", FieldType::TextArea)
                .ai_generate()
                .placeholder("Ex : Nous sollicitons un financement de ..."),
        )
}

fn conditions() -> Section {
    Section::new("conditions_delais", "Conditions et Délais")
        .field(FieldSpec::new("Date limite de candidature", FieldType::Date))
        .field(
            FieldSpec::new("Conditions particulières", FieldType::TextArea)
                .placeholder("Ex : Répondre avant le 31 décembre 2025, projet démarrant sous 6 mois"),
        )
        .field(
            FieldSpec::new("Engagement de respect des conditions", FieldType::CheckboxGroup)
                .options(["J\u{2019}accepte et je m\u{2019}engage à respecter les conditions de l\u{2019}appel à projet."]),
        )
}

fn impact() -> Section {
    Section::new("impact_evaluation", "Impact et Évaluation")
        .field(
            FieldSpec::new("Méthodes d\u{2019}évaluation", FieldType::TextArea)
                .ai_generate()
                .placeholder("Ex : Nombre de participants, satisfaction, retour public..."),
        )
        .field(
            FieldSpec::new("Objectifs mesurables", FieldType::List)
                .placeholder("Ex : 100 enfants participants, 3 spectacles réalisés, 1 podcast produit"),
        )
}

fn partners() -> Section {
    Section::new("partenaires_soutiens", "Partenaires et Soutiens")
        .field(
            FieldSpec::new("Partenaires", FieldType::List)
                .placeholder("Ex : École Arc-en-Ciel, Ville de Parempuyre, Centre Culturel"),
        )
        .field(
            FieldSpec::new("Logo des partenaires", FieldType::ImageList)
                .modes([AcquisitionMode::Upload, AcquisitionMode::Url]),
        )
}

fn attachments() -> Section {
    Section::new("documents_joins", "Pièces Jointes")
        .field(
            FieldSpec::new("Logo de l\u{2019}association", FieldType::Image)
                .modes([AcquisitionMode::Upload, AcquisitionMode::Url]),
        )
        .field(FieldSpec::new("Statuts ou Kbis", FieldType::File).modes([AcquisitionMode::Upload]))
        .field(
            FieldSpec::new("Attestation d\u{2019}assurance", FieldType::File)
                .modes([AcquisitionMode::Upload]),
        )
        .field(FieldSpec::new("Mémoire technique", FieldType::TextArea).ai_generate())
        .field(
            FieldSpec::new("Autres documents", FieldType::FileList).modes([AcquisitionMode::Upload]),
        )
}

fn signature() -> Section {
    Section::new("signature", "Signature et Engagement")
        .field(
            FieldSpec::new("Nom du signataire", FieldType::Text)
                .placeholder("Nom et prénom du représentant légal"),
        )
        .field(FieldSpec::new("Date de signature", FieldType::Date).auto_today())
        .field(
            FieldSpec::new("Signature", FieldType::Image)
                .modes([AcquisitionMode::Upload, AcquisitionMode::Draw]),
        )
}

fn export_actions() -> Section {
    Section::new("export_envoi", "Export & Envoi")
        .field(
            FieldSpec::new("Choisir la mairie destinataire", FieldType::MunicipalitySelect)
                .placeholder("Sélectionnez une mairie pour l'envoi")
                .required(),
        )
        .field(
            FieldSpec::new("Exporter en PDF", FieldType::ActionButton)
                .style("secondary")
                .action("generate_pdf"),
        )
        .field(
            FieldSpec::new("Exporter en PDF et Envoyer", FieldType::ActionButton)
                .style("primary")
                .action("generate_pdf_and_send"),
        )
}
